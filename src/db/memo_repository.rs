// src/db/memo_repository.rs
// DOCUMENTATION: Memo database operations
// PURPOSE: All SQL touching the memos table

use crate::errors::AppError;
use crate::models::Memo;
use sqlx::SqlitePool;

pub struct MemoRepository;

/// Escape LIKE wildcards so the keyword matches literally (ESCAPE '\')
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

impl MemoRepository {
    /// All memos, newest first
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Memo>, AppError> {
        let memos = sqlx::query_as::<_, Memo>(
            "SELECT id, content, created_at FROM memos ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(memos)
    }

    /// Insert a memo whose content is already sanitized
    pub async fn insert(
        pool: &SqlitePool,
        content: &str,
        created_at: &str,
    ) -> Result<Memo, AppError> {
        let result = sqlx::query("INSERT INTO memos (content, created_at) VALUES (?, ?)")
            .bind(content)
            .bind(created_at)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to insert memo: {}", e);
                AppError::DatabaseError(e.to_string())
            })?;

        let memo = Memo {
            id: result.last_insert_rowid(),
            content: content.to_string(),
            created_at: created_at.to_string(),
        };
        log::info!("Created memo with id: {}", memo.id);
        Ok(memo)
    }

    /// Delete a memo; true when a row was removed
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM memos WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Substring search, newest first
    pub async fn search(pool: &SqlitePool, keyword: &str) -> Result<Vec<Memo>, AppError> {
        let memos = sqlx::query_as::<_, Memo>(
            r#"
            SELECT id, content, created_at FROM memos
            WHERE content LIKE ? ESCAPE '\'
            ORDER BY id DESC
            "#,
        )
        .bind(like_pattern(keyword))
        .fetch_all(pool)
        .await?;

        Ok(memos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::test_pool;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[tokio::test]
    async fn test_insert_list_delete() {
        let pool = test_pool().await;

        let first = MemoRepository::insert(&pool, "first", "2024-01-01 10:00:00").await.unwrap();
        let second = MemoRepository::insert(&pool, "second", "2024-01-01 10:01:00").await.unwrap();
        assert!(second.id > first.id);

        let memos = MemoRepository::list(&pool).await.unwrap();
        assert_eq!(memos, vec![second.clone(), first.clone()]);

        assert!(MemoRepository::delete(&pool, first.id).await.unwrap());
        assert!(!MemoRepository::delete(&pool, first.id).await.unwrap());
        assert_eq!(MemoRepository::list(&pool).await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_search_is_literal() {
        let pool = test_pool().await;
        MemoRepository::insert(&pool, "100% done", "2024-01-01 10:00:00").await.unwrap();
        MemoRepository::insert(&pool, "1000 done", "2024-01-01 10:00:00").await.unwrap();

        let hits = MemoRepository::search(&pool, "0%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "100% done");

        let hits = MemoRepository::search(&pool, "done").await.unwrap();
        assert_eq!(hits.len(), 2);
    }
}
