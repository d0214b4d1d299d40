//! Pure market data services plus the thin loader that feeds them

pub mod conversion_service;
pub mod market_service;
pub mod normalize_service;
pub mod report_service;
