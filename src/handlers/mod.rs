// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod chat;
pub mod files;
pub mod health;
pub mod memos;
pub mod misc;
pub mod stock_codes;

pub use chat::config as chat_config;
pub use files::config as files_config;
pub use health::config as health_config;
pub use memos::config as memos_config;
pub use misc::config as misc_config;
pub use stock_codes::config as stock_codes_config;

use crate::errors::AppError;
use actix_web::{web, Error, HttpRequest};

fn bad_request<E: std::fmt::Display>(err: E, req: &HttpRequest) -> Error {
    log::warn!("Rejected request to {}: {}", req.path(), err);
    AppError::InvalidInput(err.to_string()).into()
}

/// Route Query/Form/Json extractor failures through AppError so they keep the JSON envelope
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(bad_request))
        .app_data(web::FormConfig::default().error_handler(bad_request))
        .app_data(web::JsonConfig::default().error_handler(bad_request));
}
