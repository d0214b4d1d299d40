//! Data models for market snapshots and conversions
//!
//! Models are plain values: the normalizer and conversion services build them,
//! the report service renders them.

pub mod conversion;
pub mod snapshot;
pub mod upstream;

// Re-export commonly used types for convenience
pub use conversion::{
    BitcoinAmount, ConversionInput, ConversionRejected, ConversionResult, MetalAmount,
    MetalOutcome, RejectReason, GRAMS_PER_TROY_OUNCE, SATOSHIS_PER_BTC,
};
pub use snapshot::{MarketStats, PriceSnapshot, Provenance, UsdPrice};
pub use upstream::UpstreamResponse;
