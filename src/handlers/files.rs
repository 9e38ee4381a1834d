// src/handlers/files.rs
// DOCUMENTATION: Directory browsing and static asset endpoints
// PURPOSE: Read-only views of the configured assets directory

use crate::config::Config;
use crate::errors::AppError;
use crate::models::ApiResponse;
use crate::services::FileService;
use actix_web::{web, HttpResponse, Responder};

/// GET /api/getAllCodes/
/// Lists the assets directory, inlining .txt contents
pub async fn get_all_codes(config: web::Data<Config>) -> Result<impl Responder, AppError> {
    if config.assets_dir.as_os_str().is_empty() {
        return Err(AppError::ConfigError("ASSETS_DIR not set".to_string()));
    }

    let listing = FileService::get_directory_contents(&config.assets_dir)?;
    Ok(ApiResponse::ok(listing))
}

/// GET /static/{path}
pub async fn static_file(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let file = FileService::resolve_asset(&config.assets_dir, &path.into_inner())?;
    let bytes = tokio::fs::read(&file).await?;
    let mime = mime_guess::from_path(&file).first_or_octet_stream();

    Ok(HttpResponse::Ok().content_type(mime).body(bytes))
}

/// Configuration for file routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/getAllCodes/", web::get().to(get_all_codes))
        .route("/static/{path:.*}", web::get().to(static_file));
}
