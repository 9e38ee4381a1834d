// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database and services, then start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use config::Config;
use dotenv::dotenv;
use services::{
    ChatHub, LocalClock, MemoService, SensitiveWords, StockApiClient, StockCodeService,
    VisitService,
};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        // Use configured log level or default
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        anyhow::bail!("invalid configuration: {}", e);
    }

    log::info!("Starting zapp-backend...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = config::init_db_pool(&config)
        .await
        .context("failed to connect to database")?;

    // 5. Build services
    let clock = LocalClock::new(config.utc_offset_hours);

    let sensitive_words = Arc::new(SensitiveWords::load(&config.sensitive_words_file));
    if sensitive_words.is_empty() {
        log::warn!("No sensitive words loaded - memo content filtering is off");
    }
    let memo_service = MemoService::new(pool.clone(), clock, sensitive_words);

    let stock_code_service = StockCodeService::new(
        pool.clone(),
        clock,
        config.assets_dir.clone(),
        config.data_dir.clone(),
    )
    .context("failed to prepare data directory")?;
    let imported = stock_code_service.import_codes().await;
    log::info!("Stock code ledger ready ({} codes in code list)", imported);

    let visit_service = VisitService::new(pool.clone(), clock, config.rate_limit_per_minute);

    let stock_api = StockApiClient::new(
        config.stock_api_base_url.clone(),
        Duration::from_secs(config.stock_api_timeout),
    )
    .context("failed to build stock API client")?;

    let chat_hub = ChatHub::new();

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);
    let memo_data = web::Data::new(memo_service);
    let stock_code_data = web::Data::new(stock_code_service);
    let visit_data = web::Data::new(visit_service);
    let stock_api_data = web::Data::new(stock_api);
    let chat_data = web::Data::new(chat_hub);

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(config_data.clone())
            .app_data(memo_data.clone())
            .app_data(stock_code_data.clone())
            .app_data(visit_data.clone())
            .app_data(stock_api_data.clone())
            .app_data(chat_data.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::extractor_config)
            .configure(handlers::health_config)
            .configure(handlers::memos_config)
            .configure(handlers::stock_codes_config)
            .configure(handlers::files_config)
            .configure(handlers::misc_config)
            .configure(handlers::chat_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
