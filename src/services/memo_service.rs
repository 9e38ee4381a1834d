// src/services/memo_service.rs
// DOCUMENTATION: Business logic for memos
// PURPOSE: Validate and sanitize memo input before it reaches the repository

use crate::db::MemoRepository;
use crate::errors::AppError;
use crate::models::{Memo, MAX_KEYWORD_CHARS, MAX_MEMO_CHARS};
use crate::services::{LocalClock, SensitiveWords};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Escape text for HTML output
/// DOCUMENTATION: Same table as Python's html.escape(quote=True)
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Memo operations with input validation, sensitive word filtering and XSS escaping
#[derive(Clone)]
pub struct MemoService {
    pool: SqlitePool,
    clock: LocalClock,
    sensitive_words: Arc<SensitiveWords>,
}

impl MemoService {
    pub fn new(pool: SqlitePool, clock: LocalClock, sensitive_words: Arc<SensitiveWords>) -> Self {
        Self {
            pool,
            clock,
            sensitive_words,
        }
    }

    pub async fn list_memos(&self) -> Result<Vec<Memo>, AppError> {
        MemoRepository::list(&self.pool).await
    }

    /// Validate, filter and escape `content`, then store it
    pub async fn add_memo(&self, content: &str) -> Result<Memo, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::ValidationError("Content cannot be empty".to_string()));
        }

        let length = content.chars().count();
        if length > MAX_MEMO_CHARS {
            return Err(AppError::ValidationError(format!(
                "Content too long ({} characters, maximum {})",
                length, MAX_MEMO_CHARS
            )));
        }

        self.check_sensitive_words(content)?;

        let escaped = escape_html(content);
        let created_at = self.clock.now_string();
        MemoRepository::insert(&self.pool, &escaped, &created_at).await
    }

    /// Delete by id; false when no memo had that id
    pub async fn delete_memo(&self, id: i64) -> Result<bool, AppError> {
        if id <= 0 {
            return Err(AppError::ValidationError(format!("Invalid ID: {}", id)));
        }
        MemoRepository::delete(&self.pool, id).await
    }

    pub async fn search_memos(&self, keyword: &str) -> Result<Vec<Memo>, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::ValidationError("Keyword cannot be empty".to_string()));
        }
        if keyword.chars().count() > MAX_KEYWORD_CHARS {
            return Err(AppError::ValidationError(format!(
                "Keyword too long (maximum {} characters)",
                MAX_KEYWORD_CHARS
            )));
        }
        MemoRepository::search(&self.pool, keyword).await
    }

    fn check_sensitive_words(&self, content: &str) -> Result<(), AppError> {
        if let Some(word) = self.sensitive_words.find_in(content) {
            // Only the length is logged, the word itself stays out of the logs
            log::warn!("Rejected memo containing a sensitive word ({} chars)", word.chars().count());
            return Err(AppError::SensitiveContent);
        }
        Ok(())
    }
}
