use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::UpstreamResponse;

/// Which upstream endpoint (and therefore which body shape) to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// `GET {backend}/api/asset-prices`: bitcoin, gold and silver
    AssetPrices,
    /// `GET {backend}/api/market-data`: bitcoin dashboard proxied from CoinGecko
    MarketData,
    /// CoinGecko `/simple/price` called directly
    CoinGecko,
}

impl FeedKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asset-prices" | "asset_prices" | "assets" => Some(FeedKind::AssetPrices),
            "market-data" | "market_data" | "backend" => Some(FeedKind::MarketData),
            "coingecko" | "cg" => Some(FeedKind::CoinGecko),
            _ => None,
        }
    }

    /// Map a raw body of this feed's shape to the boundary type.
    ///
    /// Only a body that is not a JSON object fails; a malformed per-asset
    /// field just leaves that asset's price absent.
    pub fn adapt(self, body: &str) -> Result<UpstreamResponse, ApiError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse {} body: {}", self, e)))?;
        if !value.is_object() {
            return Err(ApiError::Deserialization(format!(
                "Expected a JSON object from {}, got: {}",
                self, value
            )));
        }

        let parsed: Result<UpstreamResponse, serde_json::Error> = match self {
            FeedKind::AssetPrices => serde_json::from_value::<AssetPricesResponse>(value).map(Into::into),
            FeedKind::MarketData | FeedKind::CoinGecko => {
                serde_json::from_value::<SimplePriceResponse>(value).map(Into::into)
            }
        };
        parsed.map_err(|e| ApiError::Deserialization(format!("Failed to parse {} body: {}", self, e)))
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedKind::AssetPrices => write!(f, "asset-prices"),
            FeedKind::MarketData => write!(f, "market-data"),
            FeedKind::CoinGecko => write!(f, "coingecko"),
        }
    }
}

/// Body of the backend asset-prices endpoint:
/// `{"bitcoin": {"usd": ..}, "gold": {"price_per_ounce_usd": ..}, "silver": {..}}`.
///
/// Per-asset records stay untyped so one wrong-shaped record only loses that asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPricesResponse {
    #[serde(default)]
    pub bitcoin: Option<Value>,
    #[serde(default)]
    pub gold: Option<Value>,
    #[serde(default)]
    pub silver: Option<Value>,
}

/// `{"bitcoin": {"usd": .., "usd_24h_change": .., "usd_market_cap": .., "last_updated_at": ..}}`
/// from CoinGecko or the backend proxy in front of it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimplePriceResponse {
    #[serde(default)]
    pub bitcoin: Option<Value>,
}

/// Field `key` of a record, if the record is an object that has it
fn field(record: Option<&Value>, key: &str) -> Option<Value> {
    record.and_then(|r| r.get(key)).cloned()
}

impl From<AssetPricesResponse> for UpstreamResponse {
    fn from(body: AssetPricesResponse) -> Self {
        UpstreamResponse {
            bitcoin_usd: field(body.bitcoin.as_ref(), "usd"),
            gold_usd_per_troy_ounce: field(body.gold.as_ref(), "price_per_ounce_usd"),
            silver_usd_per_troy_ounce: field(body.silver.as_ref(), "price_per_ounce_usd"),
            ..Default::default()
        }
    }
}

impl From<SimplePriceResponse> for UpstreamResponse {
    fn from(body: SimplePriceResponse) -> Self {
        let quote = body.bitcoin.as_ref();
        UpstreamResponse {
            bitcoin_usd: field(quote, "usd"),
            bitcoin_24h_change_pct: field(quote, "usd_24h_change"),
            bitcoin_market_cap_usd: field(quote, "usd_market_cap"),
            last_updated_at: field(quote, "last_updated_at"),
            ..Default::default()
        }
    }
}

/// Error body some endpoints send along with a failure status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<Value>,
    pub message: Option<String>,
}

/// Errors raised while talking to a market data feed
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 401/403
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {retry_after_secs:?} s")]
    RateLimited { retry_after_secs: Option<u64> },
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// Network/request error
    #[error("Request Error: {0}")]
    Request(String),
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
    #[error("COINGECKO_API_KEY is not set")]
    MissingApiKey,
}
