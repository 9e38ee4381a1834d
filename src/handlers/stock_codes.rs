// src/handlers/stock_codes.rs
// DOCUMENTATION: Stock code ledger endpoints
// PURPOSE: Allocation, bookkeeping and export of stock codes and their data files

use crate::errors::AppError;
use crate::models::{ApiResponse, CodeQuery, MarkCodeRequest, MarkCodeResponse, UsedCodeList};
use crate::services::StockCodeService;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, Either, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

fn attachment(filename: String) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    }
}

fn required_code(query: &CodeQuery) -> Result<&str, AppError> {
    query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing 'code' parameter".to_string()))
}

/// GET /api/noUseCode/
pub async fn no_use_code(service: web::Data<StockCodeService>) -> Result<impl Responder, AppError> {
    let code = service
        .get_unused_code()
        .await?
        .ok_or_else(|| AppError::NotFound("No unused code available".to_string()))?;
    Ok(ApiResponse::ok(code))
}

/// POST /api/addTodayCode/
/// Accepts a JSON body or a form with `code` and optional `codeData`
pub async fn add_today_code(
    service: web::Data<StockCodeService>,
    body: Either<web::Json<MarkCodeRequest>, web::Form<MarkCodeRequest>>,
) -> Result<impl Responder, AppError> {
    let req = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    if let Err(e) = req.validate() {
        return Err(AppError::ValidationError(e.to_string()));
    }

    let code = req.code.trim();
    let used_at = service
        .mark_code_as_used(code, req.code_data.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Code not found: {}", code)))?;

    Ok(ApiResponse::ok(MarkCodeResponse {
        code: code.to_string(),
        used_at,
    }))
}

/// GET /api/getCodeInfo/?code=
pub async fn get_code_info(
    service: web::Data<StockCodeService>,
    query: web::Query<CodeQuery>,
) -> Result<impl Responder, AppError> {
    let code = required_code(&query)?;
    let info = service
        .get_code_info(code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Code not found: {}", code)))?;
    Ok(ApiResponse::ok(info))
}

/// GET /api/getAllUsedCodes/
pub async fn get_all_used_codes(
    service: web::Data<StockCodeService>,
) -> Result<impl Responder, AppError> {
    let codes = service.get_all_used_codes().await?;
    Ok(ApiResponse::ok(codes))
}

/// GET /api/getUsedCodeList/
pub async fn get_used_code_list(
    service: web::Data<StockCodeService>,
) -> Result<impl Responder, AppError> {
    let codes = service.get_used_code_list().await?;
    Ok(ApiResponse::ok(UsedCodeList {
        count: codes.len(),
        codes,
    }))
}

/// GET /api/downloadCodeData/?code=
pub async fn download_code_data(
    service: web::Data<StockCodeService>,
    query: web::Query<CodeQuery>,
) -> Result<HttpResponse, AppError> {
    let code = required_code(&query)?;
    let (filename, bytes) = service
        .export_code_data(code)?
        .ok_or_else(|| AppError::NotFound(format!("No data for code: {}", code)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(attachment(filename))
        .body(bytes))
}

/// GET /api/downloadAllCodeData/
pub async fn download_all_code_data(
    service: web::Data<StockCodeService>,
) -> Result<HttpResponse, AppError> {
    let archive = service.export_all_code_data()?;

    Ok(HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(attachment(service.archive_name()))
        .body(archive))
}

/// POST /api/resetCodes/
pub async fn reset_codes(service: web::Data<StockCodeService>) -> Result<impl Responder, AppError> {
    let reset = service.reset_code_usage().await?;
    Ok(ApiResponse::ok(json!({ "reset": reset })))
}

/// GET /api/codeStats/
pub async fn code_stats(service: web::Data<StockCodeService>) -> Result<impl Responder, AppError> {
    let stats = service.stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// Configuration for stock code routes
/// Full paths: an "/api" scope would capture every other /api route
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/noUseCode/", web::get().to(no_use_code))
        .route("/api/addTodayCode/", web::post().to(add_today_code))
        .route("/api/getCodeInfo/", web::get().to(get_code_info))
        .route("/api/getAllUsedCodes/", web::get().to(get_all_used_codes))
        .route("/api/getUsedCodeList/", web::get().to(get_used_code_list))
        .route("/api/downloadCodeData/", web::get().to(download_code_data))
        .route("/api/downloadAllCodeData/", web::get().to(download_all_code_data))
        .route("/api/resetCodes/", web::post().to(reset_codes))
        .route("/api/codeStats/", web::get().to(code_stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::test_pool;
    use crate::handlers::extractor_config;
    use crate::services::{LocalClock, CODE_LIST_FILE};
    use actix_web::{http::header, http::StatusCode, test, App};
    use serde_json::Value;
    use std::fs;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    async fn setup() -> (StockCodeService, TempDir, TempDir) {
        let assets = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        fs::write(
            assets.path().join(CODE_LIST_FILE),
            "平安银行(000001)\n万科A(000002)\n国华网安(000004)\n",
        )
        .unwrap();

        let service = StockCodeService::new(
            test_pool().await,
            LocalClock::default(),
            assets.path().to_path_buf(),
            data.path().to_path_buf(),
        )
        .unwrap();
        service.import_codes().await;
        (service, assets, data)
    }

    #[actix_web::test]
    async fn test_allocate_and_mark_flow() {
        let (service, _assets, data) = setup().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/noUseCode/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["code"], "000001");
        assert_eq!(body["data"]["used"], false);

        let req = test::TestRequest::post()
            .uri("/api/addTodayCode/")
            .set_json(json!({"code": "000001", "codeData": "json payload"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["code"], "000001");
        let used_at = body["data"]["used_at"].clone();
        assert!(used_at.is_string());

        let req = test::TestRequest::post()
            .uri("/api/addTodayCode/")
            .set_form([("code", "000002"), ("codeData", "form payload")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            fs::read_to_string(data.path().join("000002.txt")).unwrap(),
            "form payload"
        );

        let req = test::TestRequest::get()
            .uri("/api/getCodeInfo/?code=000001")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["codeData"], "json payload");
        assert_eq!(body["data"]["used_at"], used_at);

        let req = test::TestRequest::get().uri("/api/getUsedCodeList/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["count"], 2);

        let req = test::TestRequest::get().uri("/api/getAllUsedCodes/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get().uri("/api/codeStats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!({"total": 3, "used": 2, "unused": 1}));

        let req = test::TestRequest::post().uri("/api/resetCodes/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["reset"], 3);
        assert!(!data.path().join("000001.txt").exists());
    }

    #[actix_web::test]
    async fn test_unknown_and_missing_codes() {
        let (service, _assets, _data) = setup().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/addTodayCode/")
            .set_json(json!({"code": "999999"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/addTodayCode/")
            .set_json(json!({"code": "../../x"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/addTodayCode/")
            .set_json(json!({"codeData": "x"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
        assert!(body["data"].is_null());
        assert!(body["message"].as_str().unwrap().contains("code"));

        let req = test::TestRequest::get().uri("/api/getCodeInfo/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Missing 'code' parameter");

        let req = test::TestRequest::get()
            .uri("/api/downloadCodeData/?code=000004")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_no_unused_code_left() {
        let (service, _assets, _data) = setup().await;
        for code in ["000001", "000002", "000004"] {
            service.mark_code_as_used(code, None).await.unwrap();
        }
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/noUseCode/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_downloads() {
        let (service, _assets, data) = setup().await;
        for code in ["000001", "000002", "000003"] {
            fs::write(
                data.path().join(format!("{}.txt", code)),
                format!("Test data for {}", code),
            )
            .unwrap();
        }
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/downloadCodeData/?code=000002")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("000002.txt"));
        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"Test data for 000002");

        let req = test::TestRequest::get()
            .uri("/api/downloadAllCodeData/")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/zip"
        );
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().starts_with("attachment; filename="));

        let body = test::read_body(resp).await;
        let mut zip = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
        for code in ["000001", "000002", "000003"] {
            let mut content = String::new();
            zip.by_name(&format!("{}.txt", code))
                .unwrap()
                .read_to_string(&mut content)
                .unwrap();
            assert_eq!(content, format!("Test data for {}", code));
        }
    }
}
