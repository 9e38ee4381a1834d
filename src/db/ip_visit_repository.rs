// src/db/ip_visit_repository.rs
// DOCUMENTATION: IP visit log database operations
// PURPOSE: Append and query the ip_visits table

use crate::errors::AppError;
use crate::models::{IpVisit, NewIpVisit};
use sqlx::SqlitePool;

pub struct IpVisitRepository;

impl IpVisitRepository {
    pub async fn record(
        pool: &SqlitePool,
        visit: &NewIpVisit,
        visited_at: &str,
    ) -> Result<IpVisit, AppError> {
        let result = sqlx::query(
            "INSERT INTO ip_visits (ip, user_agent, path, visited_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&visit.ip)
        .bind(&visit.user_agent)
        .bind(&visit.path)
        .bind(visited_at)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to record visit from {}: {}", visit.ip, e);
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(IpVisit {
            id: result.last_insert_rowid(),
            ip: visit.ip.clone(),
            user_agent: visit.user_agent.clone(),
            path: visit.path.clone(),
            visited_at: visited_at.to_string(),
        })
    }

    pub async fn count_for_ip(pool: &SqlitePool, ip: &str) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ip_visits WHERE ip = ?")
            .bind(ip)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Most recent visits first
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<IpVisit>, AppError> {
        let visits = sqlx::query_as::<_, IpVisit>(
            "SELECT id, ip, user_agent, path, visited_at FROM ip_visits ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(visits)
    }
}
