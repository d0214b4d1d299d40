//! Runtime configuration.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::market_data::FeedKind;

const DEFAULT_BACKEND_URL: &str = "https://satsofbitcoin-backend.onrender.com";
const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown MARKET_DATA_FEED '{0}'. Use: asset-prices, market-data, coingecko")]
    UnknownFeed(String),
    #[error("MARKET_DATA_TIMEOUT_SECS must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),
    #[error("COINGECKO_API_KEY must be set to use the coingecko feed")]
    MissingApiKey,
}

/// Configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed: FeedKind,
    pub backend_url: String,
    pub coingecko_url: String,
    pub coingecko_api_key: Option<String>,
    /// Read this file instead of fetching; the snapshot is tagged as cached
    pub cache_file: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedKind::AssetPrices,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            coingecko_url: DEFAULT_COINGECKO_URL.to_string(),
            coingecko_api_key: None,
            cache_file: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Optional:
    /// - `MARKET_DATA_FEED`: asset-prices (default), market-data or coingecko
    /// - `MARKET_DATA_BACKEND_URL`: backend base URL
    /// - `COINGECKO_API_URL`: CoinGecko base URL
    /// - `COINGECKO_API_KEY`: demo API key, required for the coingecko feed
    /// - `MARKET_DATA_CACHE_FILE`: cached response body to read instead of fetching
    /// - `MARKET_DATA_TIMEOUT_SECS`: request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Config::default();

        let feed = match get("MARKET_DATA_FEED") {
            Some(raw) => FeedKind::parse(&raw).ok_or(ConfigError::UnknownFeed(raw))?,
            None => defaults.feed,
        };

        let request_timeout_secs = match get("MARKET_DATA_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => defaults.request_timeout_secs,
        };

        let cache_file = get("MARKET_DATA_CACHE_FILE").map(PathBuf::from);
        let coingecko_api_key = get("COINGECKO_API_KEY");

        // Only live fetches need the key
        if feed == FeedKind::CoinGecko && cache_file.is_none() && coingecko_api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            feed,
            backend_url: get("MARKET_DATA_BACKEND_URL").unwrap_or(defaults.backend_url),
            coingecko_url: get("COINGECKO_API_URL").unwrap_or(defaults.coingecko_url),
            coingecko_api_key,
            cache_file,
            request_timeout_secs,
        })
    }
}
