//! Conversion request and result models

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::snapshot::Provenance;

/// Satoshis in one bitcoin
pub const SATOSHIS_PER_BTC: f64 = 100_000_000.0;

/// Grams in one troy ounce, used for both gold and silver
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// A USD amount as handed over by the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionInput {
    /// Raw text from an input field, not yet parsed
    Text(String),
    Amount(f64),
}

impl From<&str> for ConversionInput {
    fn from(text: &str) -> Self {
        ConversionInput::Text(text.to_string())
    }
}

impl From<String> for ConversionInput {
    fn from(text: String) -> Self {
        ConversionInput::Text(text)
    }
}

impl From<f64> for ConversionInput {
    fn from(amount: f64) -> Self {
        ConversionInput::Amount(amount)
    }
}

/// Equivalent Bitcoin quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitcoinAmount {
    pub btc: f64,
    pub satoshis: f64,
}

/// Equivalent precious-metal quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetalAmount {
    pub ounces_troy: f64,
    pub grams: f64,
}

/// Per-metal outcome: computed, or no usable price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MetalOutcome {
    Available(MetalAmount),
    Unavailable,
}

impl MetalOutcome {
    pub fn amount(&self) -> Option<&MetalAmount> {
        match self {
            MetalOutcome::Available(amount) => Some(amount),
            MetalOutcome::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub usd_amount: f64,
    pub bitcoin: BitcoinAmount,
    pub gold: MetalOutcome,
    pub silver: MetalOutcome,
    pub source: Provenance,
    pub priced_at: DateTime<Utc>,
}

/// Why a conversion was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("Please enter a valid USD amount")]
    InvalidAmount,
    #[error("Could not load live prices. Please try again later.")]
    MarketDataUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("{reason}")]
pub struct ConversionRejected {
    pub reason: RejectReason,
}

impl From<RejectReason> for ConversionRejected {
    fn from(reason: RejectReason) -> Self {
        ConversionRejected { reason }
    }
}
