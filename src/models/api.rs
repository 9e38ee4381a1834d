// src/models/api.rs
// DOCUMENTATION: Response envelope shared by every JSON endpoint
// PURPOSE: Keep the {code, data, message} contract in one place

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// Envelope wrapping every JSON payload
/// Errors use the same shape, see `AppError::error_response`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            data: Some(data),
            message: "success".to_string(),
        }
    }

    /// 200 response carrying this envelope
    pub fn ok(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::success(data))
    }
}

impl ApiResponse<()> {
    /// Success with `data: null`
    pub fn empty() -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse::<()> {
            code: 200,
            data: None,
            message: "success".to_string(),
        })
    }
}
