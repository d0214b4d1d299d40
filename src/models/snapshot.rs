//! Market snapshot models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A USD price that is known to be finite and strictly positive
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct UsdPrice(f64);

impl UsdPrice {
    /// Returns `None` for zero, negative, NaN or infinite values
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(UsdPrice(value))
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Cached,
    Error,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Live => write!(f, "live"),
            Provenance::Cached => write!(f, "cached"),
            Provenance::Error => write!(f, "error"),
        }
    }
}

/// Bitcoin dashboard figures some feeds carry alongside the price
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketStats {
    pub change_24h_pct: Option<f64>,
    pub market_cap_usd: Option<UsdPrice>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// One immutable capture of market prices.
///
/// Built only by the normalizer, so a `Live` or `Cached` snapshot always has a
/// Bitcoin price and an `Error` snapshot never has any price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    bitcoin_usd: Option<UsdPrice>,
    gold_usd_per_troy_ounce: Option<UsdPrice>,
    silver_usd_per_troy_ounce: Option<UsdPrice>,
    captured_at: DateTime<Utc>,
    source: Provenance,
    stats: MarketStats,
}

impl PriceSnapshot {
    /// Snapshot with usable prices. Provenance must not be `Error`.
    pub(crate) fn priced(
        bitcoin_usd: UsdPrice,
        gold_usd_per_troy_ounce: Option<UsdPrice>,
        silver_usd_per_troy_ounce: Option<UsdPrice>,
        stats: MarketStats,
        source: Provenance,
        captured_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(source != Provenance::Error);
        PriceSnapshot {
            bitcoin_usd: Some(bitcoin_usd),
            gold_usd_per_troy_ounce,
            silver_usd_per_troy_ounce,
            captured_at,
            source,
            stats,
        }
    }

    /// Degraded snapshot with no prices at all
    pub fn error(captured_at: DateTime<Utc>) -> Self {
        PriceSnapshot {
            bitcoin_usd: None,
            gold_usd_per_troy_ounce: None,
            silver_usd_per_troy_ounce: None,
            captured_at,
            source: Provenance::Error,
            stats: MarketStats::default(),
        }
    }

    pub fn bitcoin_usd(&self) -> Option<UsdPrice> {
        self.bitcoin_usd
    }

    pub fn gold_usd_per_troy_ounce(&self) -> Option<UsdPrice> {
        self.gold_usd_per_troy_ounce
    }

    pub fn silver_usd_per_troy_ounce(&self) -> Option<UsdPrice> {
        self.silver_usd_per_troy_ounce
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn source(&self) -> Provenance {
        self.source
    }

    pub fn stats(&self) -> &MarketStats {
        &self.stats
    }

    pub fn is_error(&self) -> bool {
        self.source == Provenance::Error
    }
}
