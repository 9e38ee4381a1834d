// src/handlers/memos.rs
// DOCUMENTATION: HTTP handlers for memo operations
// PURPOSE: Parse form/query input, call MemoService, wrap results in the envelope

use crate::errors::AppError;
use crate::models::{AddMemoForm, ApiResponse, DeleteMemoForm, SearchMemoQuery};
use crate::services::MemoService;
use actix_web::{web, HttpResponse, Responder};

/// GET /api/memos/
pub async fn list_memos(service: web::Data<MemoService>) -> Result<impl Responder, AppError> {
    let memos = service.list_memos().await?;
    Ok(ApiResponse::ok(memos))
}

/// POST /api/memos/add/
pub async fn add_memo(
    service: web::Data<MemoService>,
    form: web::Form<AddMemoForm>,
) -> Result<impl Responder, AppError> {
    let memo = service.add_memo(&form.content).await?;
    Ok(ApiResponse::ok(memo))
}

/// POST /api/memos/delete/
pub async fn delete_memo(
    service: web::Data<MemoService>,
    form: web::Form<DeleteMemoForm>,
) -> Result<HttpResponse, AppError> {
    let raw = form
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("ID cannot be empty".to_string()))?;

    let id: i64 = raw
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid ID: {}", raw)))?;

    if service.delete_memo(id).await? {
        Ok(ApiResponse::empty())
    } else {
        Err(AppError::NotFound("Memo not found".to_string()))
    }
}

/// GET /api/memos/search/?keyword=
pub async fn search_memos(
    service: web::Data<MemoService>,
    query: web::Query<SearchMemoQuery>,
) -> Result<impl Responder, AppError> {
    let memos = service.search_memos(&query.keyword).await?;
    Ok(ApiResponse::ok(memos))
}

/// Configuration for memo routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/memos")
            .route("/", web::get().to(list_memos))
            .route("/add/", web::post().to(add_memo))
            .route("/delete/", web::post().to(delete_memo))
            .route("/search/", web::get().to(search_memos)),
    );
}
