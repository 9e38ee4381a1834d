// src/services/stock_api_client.rs
// DOCUMENTATION: Stock quotation API client
// PURPOSE: Fetch daily k-line quotations for one stock code, with retries

use crate::errors::AppError;
use reqwest::{header, Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

/// Android Chrome user agent; the quotation API rejects obvious bot agents
pub const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 10; SM-G973F) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/86.0.4240.198 Mobile Safari/537.36";

const REFERER: &str = "https://finance.baidu.com/";
const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Retries after the first attempt
const MAX_RETRIES: u32 = 3;

/// Stock quotation API client
/// DOCUMENTATION: One GET per quotation with exponential backoff on transient failures
#[derive(Clone)]
pub struct StockApiClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL, ending with '/'
    base_url: String,
    /// First retry delay, doubled on each further retry
    backoff: Duration,
}

impl StockApiClient {
    /// Create new client
    /// DOCUMENTATION: `timeout` applies to each attempt separately
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(ANDROID_UA)
            .build()
            .map_err(|e| AppError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            backoff: Duration::from_millis(500),
        })
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Quotation URL for `code`
    pub fn build_request_url(&self, code: &str) -> Result<Url, AppError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid stock API base URL: {}", e)))?;
        let endpoint = base
            .join("vapi/v1/getquotation")
            .map_err(|e| AppError::ConfigError(format!("Invalid stock API base URL: {}", e)))?;

        let params = [
            ("srcid", "5353"),
            ("all", "1"),
            ("pointType", "string"),
            ("group", "quotation_kline_ab"),
            ("market_type", "ab"),
            ("newFormat", "1"),
            ("finClientType", "pc"),
            ("query", code),
            ("code", code),
            ("ktype", "day"),
        ];

        Url::parse_with_params(endpoint.as_str(), &params)
            .map_err(|e| AppError::ConfigError(format!("Invalid stock API URL: {}", e)))
    }

    /// Fetch the raw quotation JSON for `code`
    /// DOCUMENTATION: Retries transport errors and 429/5xx gateway statuses up to
    /// MAX_RETRIES times; other failures return immediately as ExternalApiError
    pub async fn fetch_stock_data(&self, code: &str) -> Result<Value, AppError> {
        let url = self.build_request_url(code)?;
        let mut attempt = 0;

        loop {
            log::debug!("Stock quotation request for {} (attempt {})", code, attempt + 1);

            let result = self
                .client
                .get(url.clone())
                .header(header::REFERER, REFERER)
                .header(header::ACCEPT, ACCEPT)
                .send()
                .await;

            let error = match result {
                Ok(response) if response.status().is_success() => {
                    return response.json::<Value>().await.map_err(|e| {
                        log::error!("Failed to parse quotation for {}: {}", code, e);
                        AppError::ExternalApiError(format!("Parse error: {}", e))
                    });
                }
                Ok(response) => {
                    let status = response.status();
                    let error = format!("API error {} for url: {}", status, url);
                    if !is_retryable(status) {
                        log::error!("Stock API error for {}: {}", code, error);
                        return Err(AppError::ExternalApiError(error));
                    }
                    error
                }
                Err(e) => format!("Request failed: {}", e),
            };

            if attempt >= MAX_RETRIES {
                log::error!("Stock API gave up on {} after {} attempts: {}", code, attempt + 1, error);
                return Err(AppError::ExternalApiError(error));
            }

            let delay = self.backoff * 2u32.pow(attempt);
            log::warn!("Stock API attempt {} for {} failed ({}), retrying in {:?}", attempt + 1, code, error, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> StockApiClient {
        StockApiClient::new(base.to_string(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_build_request_url() {
        let url = client("https://finance.pae.baidu.com/")
            .build_request_url("sh600519")
            .unwrap();

        assert_eq!(url.path(), "/vapi/v1/getquotation");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 10);
        assert!(pairs.contains(&("srcid".to_string(), "5353".to_string())));
        assert!(pairs.contains(&("group".to_string(), "quotation_kline_ab".to_string())));
        assert!(pairs.contains(&("query".to_string(), "sh600519".to_string())));
        assert!(pairs.contains(&("code".to_string(), "sh600519".to_string())));
        assert!(pairs.contains(&("ktype".to_string(), "day".to_string())));
    }

    #[test]
    fn test_code_is_url_encoded() {
        let url = client("https://finance.pae.baidu.com/")
            .build_request_url("a&b=c")
            .unwrap();
        let code = url.query_pairs().find(|(k, _)| k == "code").unwrap().1.into_owned();
        assert_eq!(code, "a&b=c");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            client("not a url").build_request_url("000001"),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            assert!(is_retryable(StatusCode::from_u16(code).unwrap()));
        }
        for code in [400u16, 401, 404, 501] {
            assert!(!is_retryable(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_external_error() {
        // port 1 on loopback refuses connections immediately
        let client = client("http://127.0.0.1:1/").with_backoff(Duration::from_millis(1));
        let err = client.fetch_stock_data("000001").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApiError(_)));
    }
}
