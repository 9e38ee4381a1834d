// src/models/ip_visit.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One logged visit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IpVisit {
    pub id: i64,
    pub ip: String,
    pub user_agent: Option<String>,
    pub path: String,
    pub visited_at: String,
}

/// Visit about to be stored
#[derive(Debug, Clone)]
pub struct NewIpVisit {
    pub ip: String,
    pub user_agent: Option<String>,
    pub path: String,
}

/// Response of /api/pythongetip/
#[derive(Debug, Serialize, Deserialize)]
pub struct IpVisitResponse {
    pub ip: String,
    pub visited_at: String,
    pub visit_count: i64,
}

pub const DEFAULT_VISIT_LIMIT: i64 = 50;
pub const MAX_VISIT_LIMIT: i64 = 500;

/// Query of GET /api/ipVisits/
#[derive(Debug, Deserialize)]
pub struct VisitListQuery {
    pub limit: Option<i64>,
}

impl VisitListQuery {
    /// Requested limit clamped to 1..=500, 50 when absent
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_VISIT_LIMIT)
            .clamp(1, MAX_VISIT_LIMIT)
    }
}
