//! Raw market data at the feed boundary

use serde_json::Value;

/// What a price feed handed over, before any validation.
///
/// Fields keep the raw JSON value so the normalizer decides what counts as a
/// usable number. Each feed shape converts into this through an adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamResponse {
    pub bitcoin_usd: Option<Value>,
    pub gold_usd_per_troy_ounce: Option<Value>,
    pub silver_usd_per_troy_ounce: Option<Value>,
    pub bitcoin_24h_change_pct: Option<Value>,
    pub bitcoin_market_cap_usd: Option<Value>,
    /// Unix seconds
    pub last_updated_at: Option<Value>,
}
