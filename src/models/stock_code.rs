// src/models/stock_code.rs
// DOCUMENTATION: Stock code ledger records and request DTOs
// PURPOSE: Rows of the stock_codes table plus what the API exchanges about them

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// One row of the stock_codes ledger
/// DOCUMENTATION: The legacy codeData column is never selected; payloads live in data files
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct StockCode {
    pub id: i64,
    pub code: String,
    pub used: bool,
    pub used_at: Option<String>,
    pub created_at: String,
}

/// Ledger row joined with the content of its data file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockCodeInfo {
    #[serde(flatten)]
    pub record: StockCode,

    /// Content of `<data_dir>/<code>.txt`, None when the file is absent or unreadable
    #[serde(rename = "codeData")]
    pub code_data: Option<String>,
}

/// Body of POST /api/addTodayCode/ (JSON or form)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MarkCodeRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,

    #[serde(rename = "codeData", default)]
    pub code_data: Option<String>,
}

/// Response of POST /api/addTodayCode/
#[derive(Debug, Serialize)]
pub struct MarkCodeResponse {
    pub code: String,
    pub used_at: String,
}

/// Query carrying a single code (getCodeInfo, downloadCodeData)
#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    pub code: Option<String>,
}

/// Lightweight listing of used codes
#[derive(Debug, Serialize)]
pub struct UsedCodeList {
    pub count: usize,
    pub codes: Vec<String>,
}

/// Ledger counters
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeStats {
    pub total: i64,
    pub used: i64,
    pub unused: i64,
}
