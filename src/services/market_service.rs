use std::path::Path;

use tracing::{info, warn};

use crate::api::market_data::{ApiError, FeedKind, MarketDataClient};
use crate::config::Config;
use crate::models::{PriceSnapshot, Provenance, UpstreamResponse};
use crate::services::normalize_service;

/// Obtain the current snapshot for the configured feed.
///
/// Reads the cache file when one is configured, otherwise fetches live. Any
/// transport or parse failure ends up as an error snapshot.
pub async fn load_snapshot(config: &Config) -> PriceSnapshot {
    if let Some(path) = &config.cache_file {
        let raw = read_cached(path, config.feed);
        return normalize_service::normalize(raw.as_ref(), Provenance::Cached);
    }

    let raw = match MarketDataClient::new(config) {
        Ok(client) => fetch_live(&client, config.feed).await,
        Err(e) => {
            warn!("Could not create market data client: {}", e);
            None
        }
    };
    normalize_service::normalize(raw.as_ref(), Provenance::Live)
}

/// Fetch one feed, absorbing failures as `None`
pub async fn fetch_live(client: &MarketDataClient, feed: FeedKind) -> Option<UpstreamResponse> {
    match client.fetch(feed).await {
        Ok(raw) => {
            info!("Fetched {} feed", feed);
            Some(raw)
        }
        Err(e) => {
            warn!("Failed to fetch {} feed: {}", feed, e);
            None
        }
    }
}

/// Read a cached response body of the given feed shape, absorbing failures as `None`
pub fn read_cached(path: &Path, feed: FeedKind) -> Option<UpstreamResponse> {
    let body = match std::fs::read_to_string(path) {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read cached market data {}: {}", path.display(), e);
            return None;
        }
    };

    match feed.adapt(&body) {
        Ok(raw) => {
            info!("Loaded cached {} data from {}", feed, path.display());
            Some(raw)
        }
        Err(ApiError::Deserialization(msg)) => {
            warn!("Cached market data {} is malformed: {}", path.display(), msg);
            None
        }
        Err(e) => {
            warn!("Cached market data {} unusable: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsdPrice;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sats_oracle_{}_{}.json",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_cached_file_gives_cached_snapshot() {
        let path = temp_file(
            "cached",
            r#"{"bitcoin":{"usd":50000},"gold":{"price_per_ounce_usd":2000},"silver":{"price_per_ounce_usd":null}}"#,
        );
        let config = Config {
            cache_file: Some(path.clone()),
            ..Config::default()
        };

        let snapshot = load_snapshot(&config).await;
        assert_eq!(snapshot.source(), Provenance::Cached);
        assert_eq!(snapshot.bitcoin_usd().map(UsdPrice::get), Some(50_000.0));
        assert!(snapshot.silver_usd_per_troy_ounce().is_none());

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_cache_file_gives_error_snapshot() {
        let config = Config {
            cache_file: Some(std::env::temp_dir().join("sats_oracle_does_not_exist.json")),
            ..Config::default()
        };
        let snapshot = load_snapshot(&config).await;
        assert!(snapshot.is_error());
    }

    #[test]
    fn test_malformed_cache_file_is_absorbed() {
        let path = temp_file("malformed", "<html>502 Bad Gateway</html>");
        assert!(read_cached(&path, FeedKind::MarketData).is_none());
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_unreachable_feed_gives_error_snapshot() {
        let config = Config {
            backend_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let snapshot = load_snapshot(&config).await;
        assert!(snapshot.is_error());
    }
}
