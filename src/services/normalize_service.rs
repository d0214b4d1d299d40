use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{MarketStats, PriceSnapshot, Provenance, UpstreamResponse, UsdPrice};

/// Why a tracked price could not be established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceAbsent {
    #[error("field missing or null")]
    Missing,
    #[error("value is not numeric")]
    NotNumeric,
    #[error("value is not finite")]
    NonFinite,
    #[error("value is zero or negative")]
    NonPositive,
}

/// Normalize a raw feed response into a snapshot captured now
pub fn normalize(raw: Option<&UpstreamResponse>, provenance: Provenance) -> PriceSnapshot {
    normalize_at(raw, provenance, Utc::now())
}

/// Normalize a raw feed response into a snapshot.
///
/// Never fails: malformed prices become absent, and a response without a
/// usable Bitcoin price becomes an error snapshot.
pub fn normalize_at(
    raw: Option<&UpstreamResponse>,
    provenance: Provenance,
    captured_at: DateTime<Utc>,
) -> PriceSnapshot {
    let raw = match raw {
        Some(raw) if provenance != Provenance::Error => raw,
        Some(_) => {
            debug!("Discarding payload tagged as error fallback");
            return PriceSnapshot::error(captured_at);
        }
        None => {
            debug!("No upstream response, building error snapshot");
            return PriceSnapshot::error(captured_at);
        }
    };

    let bitcoin_usd = match parse_price(raw.bitcoin_usd.as_ref()) {
        Ok(price) => price,
        Err(reason) => {
            warn!("Bitcoin price unusable ({}), {} snapshot degraded to error", reason, provenance);
            return PriceSnapshot::error(captured_at);
        }
    };

    let gold = present_or_log("gold", raw.gold_usd_per_troy_ounce.as_ref());
    let silver = present_or_log("silver", raw.silver_usd_per_troy_ounce.as_ref());

    PriceSnapshot::priced(
        bitcoin_usd,
        gold,
        silver,
        parse_stats(raw),
        provenance,
        captured_at,
    )
}

fn present_or_log(asset: &str, value: Option<&Value>) -> Option<UsdPrice> {
    match parse_price(value) {
        Ok(price) => Some(price),
        Err(reason) => {
            debug!("{} price absent: {}", asset, reason);
            None
        }
    }
}

/// Accept only a finite, strictly positive price
fn parse_price(value: Option<&Value>) -> Result<UsdPrice, PriceAbsent> {
    let number = parse_number(value)?;
    if !number.is_finite() {
        return Err(PriceAbsent::NonFinite);
    }
    UsdPrice::new(number).ok_or(PriceAbsent::NonPositive)
}

/// JSON numbers, or strings holding a number
fn parse_number(value: Option<&Value>) -> Result<f64, PriceAbsent> {
    match value {
        None | Some(Value::Null) => Err(PriceAbsent::Missing),
        Some(Value::Number(n)) => n.as_f64().ok_or(PriceAbsent::NonFinite),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(PriceAbsent::Missing);
            }
            trimmed.parse::<f64>().map_err(|_| PriceAbsent::NotNumeric)
        }
        Some(_) => Err(PriceAbsent::NotNumeric),
    }
}

fn parse_stats(raw: &UpstreamResponse) -> MarketStats {
    let change_24h_pct = parse_number(raw.bitcoin_24h_change_pct.as_ref())
        .ok()
        .filter(|pct| pct.is_finite());
    let market_cap_usd = parse_price(raw.bitcoin_market_cap_usd.as_ref()).ok();
    let last_updated_at = parse_number(raw.last_updated_at.as_ref())
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0 && *secs <= i64::MAX as f64)
        .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single());

    MarketStats {
        change_24h_pct,
        market_cap_usd,
        last_updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn captured() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn full_response() -> UpstreamResponse {
        UpstreamResponse {
            bitcoin_usd: Some(json!(50_000.0)),
            gold_usd_per_troy_ounce: Some(json!(2_000.0)),
            silver_usd_per_troy_ounce: Some(json!(25.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_null_response_gives_error_snapshot() {
        let snapshot = normalize_at(None, Provenance::Live, captured());
        assert_eq!(snapshot.source(), Provenance::Error);
        assert!(snapshot.bitcoin_usd().is_none());
        assert!(snapshot.gold_usd_per_troy_ounce().is_none());
        assert!(snapshot.silver_usd_per_troy_ounce().is_none());
        assert_eq!(snapshot.captured_at(), captured());
    }

    #[test]
    fn test_full_response_keeps_provenance() {
        let raw = full_response();
        let live = normalize_at(Some(&raw), Provenance::Live, captured());
        assert_eq!(live.source(), Provenance::Live);
        assert_eq!(live.bitcoin_usd().map(UsdPrice::get), Some(50_000.0));
        assert_eq!(live.gold_usd_per_troy_ounce().map(UsdPrice::get), Some(2_000.0));
        assert_eq!(live.silver_usd_per_troy_ounce().map(UsdPrice::get), Some(25.0));

        let cached = normalize_at(Some(&raw), Provenance::Cached, captured());
        assert_eq!(cached.source(), Provenance::Cached);
    }

    #[test]
    fn test_metal_prices_absent_independently() {
        let raw = UpstreamResponse {
            bitcoin_usd: Some(json!(50_000)),
            gold_usd_per_troy_ounce: Some(json!(2_000)),
            silver_usd_per_troy_ounce: Some(Value::Null),
            ..Default::default()
        };
        let snapshot = normalize_at(Some(&raw), Provenance::Live, captured());
        assert!(snapshot.gold_usd_per_troy_ounce().is_some());
        assert!(snapshot.silver_usd_per_troy_ounce().is_none());
    }

    #[test]
    fn test_bad_metal_values_map_to_absent() {
        for bad in [json!(0), json!(-3.5), json!("n/a"), json!(true), json!([1]), json!({"usd": 1})] {
            let raw = UpstreamResponse {
                gold_usd_per_troy_ounce: Some(bad.clone()),
                ..full_response()
            };
            let snapshot = normalize_at(Some(&raw), Provenance::Live, captured());
            assert!(snapshot.gold_usd_per_troy_ounce().is_none(), "accepted {}", bad);
            assert!(snapshot.silver_usd_per_troy_ounce().is_some());
        }
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let raw = UpstreamResponse {
            bitcoin_usd: Some(json!(" 65000.5 ")),
            ..Default::default()
        };
        let snapshot = normalize_at(Some(&raw), Provenance::Live, captured());
        assert_eq!(snapshot.bitcoin_usd().map(UsdPrice::get), Some(65_000.5));
    }

    #[test]
    fn test_non_finite_strings_are_rejected() {
        assert_eq!(parse_price(Some(&json!("NaN"))), Err(PriceAbsent::NonFinite));
        assert_eq!(parse_price(Some(&json!("inf"))), Err(PriceAbsent::NonFinite));
        assert_eq!(parse_price(Some(&json!("Error loading data"))), Err(PriceAbsent::NotNumeric));
        assert_eq!(parse_price(Some(&json!(""))), Err(PriceAbsent::Missing));
        assert_eq!(parse_price(None), Err(PriceAbsent::Missing));
        assert_eq!(parse_price(Some(&json!(0.0))), Err(PriceAbsent::NonPositive));
    }

    #[test]
    fn test_unusable_bitcoin_price_degrades_to_error() {
        for bad in [json!(0), json!(-1), json!("Error loading data"), Value::Null] {
            let raw = UpstreamResponse {
                bitcoin_usd: Some(bad),
                ..full_response()
            };
            let snapshot = normalize_at(Some(&raw), Provenance::Cached, captured());
            assert!(snapshot.is_error());
            assert!(snapshot.gold_usd_per_troy_ounce().is_none());
            assert!(snapshot.silver_usd_per_troy_ounce().is_none());
        }
    }

    #[test]
    fn test_error_provenance_discards_prices() {
        let raw = full_response();
        let snapshot = normalize_at(Some(&raw), Provenance::Error, captured());
        assert!(snapshot.is_error());
        assert!(snapshot.bitcoin_usd().is_none());
    }

    #[test]
    fn test_stats_are_parsed_leniently() {
        let raw = UpstreamResponse {
            bitcoin_24h_change_pct: Some(json!(-2.75)),
            bitcoin_market_cap_usd: Some(json!(1.2e12)),
            last_updated_at: Some(json!(1_714_564_800)),
            ..full_response()
        };
        let stats = normalize_at(Some(&raw), Provenance::Live, captured()).stats().clone();
        assert_eq!(stats.change_24h_pct, Some(-2.75));
        assert_eq!(stats.market_cap_usd.map(UsdPrice::get), Some(1.2e12));
        assert_eq!(stats.last_updated_at, Some(Utc.timestamp_opt(1_714_564_800, 0).unwrap()));

        let raw = UpstreamResponse {
            bitcoin_24h_change_pct: Some(json!("lots")),
            bitcoin_market_cap_usd: Some(json!(0)),
            last_updated_at: Some(json!(-5)),
            ..full_response()
        };
        let stats = normalize_at(Some(&raw), Provenance::Live, captured()).stats().clone();
        assert_eq!(stats, MarketStats::default());
    }
}
