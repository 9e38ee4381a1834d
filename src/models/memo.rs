// src/models/memo.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum memo length, counted in characters after trimming
pub const MAX_MEMO_CHARS: usize = 1000;

/// Maximum search keyword length, counted in characters after trimming
pub const MAX_KEYWORD_CHARS: usize = 100;

/// A stored memo; `content` is already HTML-escaped
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Memo {
    pub id: i64,
    pub content: String,
    pub created_at: String,
}

/// Form body of POST /api/memos/add/
#[derive(Debug, Deserialize)]
pub struct AddMemoForm {
    #[serde(default)]
    pub content: String,
}

/// Form body of POST /api/memos/delete/
/// `id` stays a string so a malformed value yields our own 400 instead of a form error
#[derive(Debug, Deserialize)]
pub struct DeleteMemoForm {
    pub id: Option<String>,
}

/// Query of GET /api/memos/search/
#[derive(Debug, Deserialize)]
pub struct SearchMemoQuery {
    #[serde(default)]
    pub keyword: String,
}
