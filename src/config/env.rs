// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    /// Format: sqlite://path/to/accounting.db
    pub database_url: String,

    /// Server bind address (e.g., "0.0.0.0")
    pub server_address: String,

    /// Server listen port (default 5555)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Static assets directory (holds a.txt and anything served under /static)
    pub assets_dir: PathBuf,

    /// Directory holding one `<code>.txt` payload per used stock code
    pub data_dir: PathBuf,

    /// Base64-encoded sensitive word list, one word per line
    pub sensitive_words_file: PathBuf,

    /// Offset from UTC used for every stored timestamp (default +8, Beijing)
    pub utc_offset_hours: i32,

    /// Quote API base URL, must end with '/'
    pub stock_api_base_url: String,

    /// Quote API request timeout in seconds
    pub stock_api_timeout: u64,

    /// Maximum connections in database pool
    pub db_max_connections: u32,

    /// Connection timeout in seconds
    pub db_connection_timeout: u64,

    /// Visits per minute allowed per client IP on the IP logger
    pub rate_limit_per_minute: u32,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        let assets_dir = PathBuf::from(env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()));

        let sensitive_words_file = env::var("SENSITIVE_WORDS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| assets_dir.join("sensitive_words.txt"));

        Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://accounting.db".to_string()),

            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),

            server_port: parse_or("SERVER_PORT", 5555),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),

            assets_dir,

            sensitive_words_file,

            utc_offset_hours: parse_or("UTC_OFFSET_HOURS", 8),

            stock_api_base_url: env::var("STOCK_API_BASE_URL")
                .unwrap_or_else(|_| "https://finance.pae.baidu.com/".to_string()),

            stock_api_timeout: parse_or("STOCK_API_TIMEOUT", 30),

            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5),

            db_connection_timeout: parse_or("DB_CONNECTION_TIMEOUT", 30),

            rate_limit_per_minute: parse_or("RATE_LIMIT_PER_MINUTE", 60),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if self.server_port == 0 {
            return Err("SERVER_PORT must be non-zero".to_string());
        }

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(format!(
                "UTC_OFFSET_HOURS out of range (-12..=14): {}",
                self.utc_offset_hours
            ));
        }

        if !Path::new(&self.assets_dir).is_dir() {
            log::warn!(
                "ASSETS_DIR {} does not exist - code import and static files will not work",
                self.assets_dir.display()
            );
        }

        Ok(())
    }
}
