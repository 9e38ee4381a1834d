// src/handlers/misc.rs
// DOCUMENTATION: Small utility endpoints
// PURPOSE: Server timestamp, IP visit logger and the stock quotation proxy

use crate::errors::AppError;
use crate::models::{ApiResponse, CodeQuery, NewIpVisit, VisitListQuery};
use crate::services::{StockApiClient, VisitService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};

/// POST /api/timestamp/
pub async fn timestamp() -> impl Responder {
    ApiResponse::ok(chrono::Utc::now().timestamp())
}

async fn post_only() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed("POST"))
}

/// Client address: first X-Forwarded-For hop, then X-Real-IP, then the socket peer
pub fn client_ip(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header("X-Forwarded-For")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("X-Real-IP"))
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// GET|POST /api/pythongetip/
pub async fn python_get_ip(
    service: web::Data<VisitService>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let visit = NewIpVisit {
        ip: client_ip(&req),
        user_agent: req
            .headers()
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        path: req.path().to_string(),
    };

    let response = service.record_visit(visit).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /api/ipVisits/?limit=
pub async fn list_visits(
    service: web::Data<VisitService>,
    query: web::Query<VisitListQuery>,
) -> Result<impl Responder, AppError> {
    let visits = service.recent_visits(query.limit()).await?;
    Ok(ApiResponse::ok(visits))
}

/// GET /api/fetch_stock/?code=
pub async fn fetch_stock(
    client: web::Data<StockApiClient>,
    query: web::Query<CodeQuery>,
) -> Result<impl Responder, AppError> {
    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing 'code' parameter".to_string()))?;

    let data = client.fetch_stock_data(code).await?;
    Ok(ApiResponse::ok(data))
}

/// Configuration for misc routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/timestamp/")
            .route(web::post().to(timestamp))
            .default_service(web::to(post_only)),
    )
    .service(
        web::resource("/api/pythongetip/")
            .route(web::get().to(python_get_ip))
            .route(web::post().to(python_get_ip)),
    )
    .route("/api/ipVisits/", web::get().to(list_visits))
    .route("/api/fetch_stock/", web::get().to(fetch_stock));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::test_pool;
    use crate::handlers::extractor_config;
    use crate::services::LocalClock;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::time::Duration;

    async fn app_data() -> (web::Data<VisitService>, web::Data<StockApiClient>) {
        let visits = VisitService::new(test_pool().await, LocalClock::default(), 3);
        // nothing listens on port 1, so the proxy fails fast
        let client = StockApiClient::new("http://127.0.0.1:1/".to_string(), Duration::from_secs(1)).unwrap();
        (web::Data::new(visits), web::Data::new(client))
    }

    #[actix_web::test]
    async fn test_client_ip_precedence() {
        let req = test::TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.7");

        let req = test::TestRequest::default()
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_ip(&req), "198.51.100.2");

        let req = test::TestRequest::default()
            .peer_addr("192.0.2.1:4242".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req), "192.0.2.1");

        let req = test::TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req), "unknown");
    }

    #[actix_web::test]
    async fn test_timestamp_post_only() {
        let app = test::init_service(App::new().configure(config)).await;

        let req = test::TestRequest::post().uri("/api/timestamp/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 200);
        assert!(body["data"].as_i64().unwrap() > 1_700_000_000);

        let req = test::TestRequest::get().uri("/api/timestamp/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Method not allowed (only POST)");
    }

    #[actix_web::test]
    async fn test_ip_logger_and_listing() {
        let (visits, client) = app_data().await;
        let app = test::init_service(
            App::new()
                .app_data(visits)
                .app_data(client)
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        for expected in 1..=2 {
            let req = test::TestRequest::get()
                .uri("/api/pythongetip/")
                .insert_header(("X-Forwarded-For", "203.0.113.7"))
                .insert_header(("User-Agent", "python-requests/2.31"))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["data"]["ip"], "203.0.113.7");
            assert_eq!(body["data"]["visit_count"], expected);
        }

        let req = test::TestRequest::get().uri("/api/ipVisits/?limit=1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["user_agent"], "python-requests/2.31");

        let req = test::TestRequest::get().uri("/api/ipVisits/?limit=0").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get().uri("/api/ipVisits/?limit=abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
        assert!(body["data"].is_null());

        // quota of 3 per minute: third call passes, fourth is limited
        let req = test::TestRequest::post()
            .uri("/api/pythongetip/")
            .insert_header(("X-Forwarded-For", "203.0.113.7"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::post()
            .uri("/api/pythongetip/")
            .insert_header(("X-Forwarded-For", "203.0.113.7"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_fetch_stock_errors() {
        let (visits, client) = app_data().await;
        let app = test::init_service(
            App::new()
                .app_data(visits)
                .app_data(client)
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/fetch_stock/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Missing 'code' parameter");
    }

    #[actix_web::test]
    async fn test_visit_listing_limits() {
        let pool = test_pool().await;
        for i in 0..520 {
            let visit = NewIpVisit {
                ip: format!("10.0.{}.{}", i / 256, i % 256),
                user_agent: None,
                path: "/api/pythongetip/".to_string(),
            };
            crate::db::IpVisitRepository::record(&pool, &visit, "2024-01-01 00:00:00")
                .await
                .unwrap();
        }
        let (_, client) = app_data().await;
        let visits = VisitService::new(pool, LocalClock::default(), 60);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(visits))
                .app_data(client)
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        for (uri, expected) in [
            ("/api/ipVisits/", 50),
            ("/api/ipVisits/?limit=0", 1),
            ("/api/ipVisits/?limit=-3", 1),
            ("/api/ipVisits/?limit=1000", 500),
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["data"].as_array().unwrap().len(), expected, "{}", uri);
        }
    }
}
