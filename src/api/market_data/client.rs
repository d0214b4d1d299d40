use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, ErrorResponse, FeedKind};
use crate::config::Config;
use crate::models::UpstreamResponse;

/// Thin HTTP client for the market data feeds.
///
/// One GET per call, no retries and no caching; callers turn any error into an
/// error snapshot.
pub struct MarketDataClient {
    http_client: HttpClient,
    backend_url: String,
    coingecko_url: String,
    coingecko_api_key: Option<String>,
}

impl MarketDataClient {
    /// Create a client from loaded configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            backend_url: config.backend_url.trim_end_matches('/').to_string(),
            coingecko_url: config.coingecko_url.trim_end_matches('/').to_string(),
            coingecko_api_key: config.coingecko_api_key.clone(),
        })
    }

    /// Fetch one feed and adapt its body to the boundary shape
    pub async fn fetch(&self, kind: FeedKind) -> Result<UpstreamResponse, ApiError> {
        let body = self.fetch_body(kind).await?;
        kind.adapt(&body)
    }

    /// GET the feed endpoint and return the raw body of a successful response
    pub async fn fetch_body(&self, kind: FeedKind) -> Result<String, ApiError> {
        let request = match kind {
            FeedKind::AssetPrices => self
                .http_client
                .get(format!("{}/api/asset-prices", self.backend_url)),
            FeedKind::MarketData => self
                .http_client
                .get(format!("{}/api/market-data", self.backend_url)),
            FeedKind::CoinGecko => {
                let api_key = self
                    .coingecko_api_key
                    .as_deref()
                    .ok_or(ApiError::MissingApiKey)?;
                self.http_client
                    .get(format!("{}/simple/price", self.coingecko_url))
                    .query(&[
                        ("ids", "bitcoin"),
                        ("vs_currencies", "usd"),
                        ("include_24hr_change", "true"),
                        ("include_market_cap", "true"),
                        ("include_last_updated_at", "true"),
                        ("x-cg-demo-api-key", api_key),
                    ])
            }
        };

        debug!("Fetching {} feed", kind);
        let response = request
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(e.to_string())
                } else {
                    ApiError::Request(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok());
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), body_text, retry_after));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::Request(format!("Failed to read response body: {}", e)))
    }
}

/// Map a failure status and body to an error
fn classify_error(status_code: u16, body_text: String, retry_after_secs: Option<u64>) -> ApiError {
    let message = serde_json::from_str::<ErrorResponse>(&body_text)
        .ok()
        .and_then(|err| err.message.or_else(|| err.error.map(error_text)))
        .unwrap_or(body_text);

    match status_code {
        401 | 403 => ApiError::Unauthorized(message),
        429 => {
            warn!("Rate limited by market data feed, retry after {:?} s", retry_after_secs);
            ApiError::RateLimited { retry_after_secs }
        }
        500..=599 => {
            warn!("Server error {}: {}", status_code, message);
            ApiError::ServerError(status_code, message)
        }
        _ => ApiError::HttpError(status_code, message),
    }
}

/// `"error": "..."` is usually a string, but the backend also forwards whole objects
fn error_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
