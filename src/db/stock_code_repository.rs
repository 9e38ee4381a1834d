// src/db/stock_code_repository.rs
// DOCUMENTATION: Stock code ledger database operations
// PURPOSE: All SQL touching the stock_codes table

use crate::errors::AppError;
use crate::models::{CodeStats, StockCode};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, code, used, used_at, created_at";

pub struct StockCodeRepository;

impl StockCodeRepository {
    /// Insert codes that are not in the ledger yet, in one transaction
    /// DOCUMENTATION: Existing codes keep their usage state; returns rows actually inserted
    pub async fn insert_missing(
        pool: &SqlitePool,
        codes: &[String],
        created_at: &str,
    ) -> Result<u64, AppError> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for code in codes {
            let result =
                sqlx::query("INSERT OR IGNORE INTO stock_codes (code, created_at) VALUES (?, ?)")
                    .bind(code)
                    .bind(created_at)
                    .execute(&mut *tx)
                    .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// First unused code by id
    pub async fn first_unused(pool: &SqlitePool) -> Result<Option<StockCode>, AppError> {
        let sql = format!(
            "SELECT {} FROM stock_codes WHERE used = 0 ORDER BY id LIMIT 1",
            COLUMNS
        );
        let row = sqlx::query_as::<_, StockCode>(&sql)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_code(
        pool: &SqlitePool,
        code: &str,
    ) -> Result<Option<StockCode>, AppError> {
        let sql = format!("SELECT {} FROM stock_codes WHERE code = ?", COLUMNS);
        let row = sqlx::query_as::<_, StockCode>(&sql)
            .bind(code)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Flag a code as used; true when the code exists
    pub async fn mark_used(pool: &SqlitePool, code: &str, used_at: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE stock_codes SET used = 1, used_at = ?, codeData = NULL WHERE code = ?",
        )
        .bind(used_at)
        .bind(code)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to mark code {} as used: {}", code, e);
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear usage on every row; returns rows updated
    pub async fn reset_all(pool: &SqlitePool) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE stock_codes SET used = 0, used_at = NULL, codeData = NULL")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Used codes, most recently used first
    pub async fn list_used(pool: &SqlitePool) -> Result<Vec<StockCode>, AppError> {
        let sql = format!(
            "SELECT {} FROM stock_codes WHERE used = 1 ORDER BY used_at DESC, id DESC",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, StockCode>(&sql)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn stats(pool: &SqlitePool) -> Result<CodeStats, AppError> {
        let (total, used): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN used = 1 THEN 1 ELSE 0 END), 0) FROM stock_codes",
        )
        .fetch_one(pool)
        .await?;

        Ok(CodeStats {
            total,
            used,
            unused: total - used,
        })
    }
}
