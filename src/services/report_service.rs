use crate::models::{
    ConversionRejected, ConversionResult, MetalOutcome, PriceSnapshot, Provenance, UsdPrice,
};
use crate::utils::format::{format_billions, format_change_pct, format_usd, group_thousands};
use crate::utils::Table;

const UNAVAILABLE: &str = "unavailable";

/// Render the market data dashboard for a snapshot
pub fn render_market_dashboard(snapshot: &PriceSnapshot) -> String {
    let mut table = Table::new(vec!["Market Data", "Value"]).align_right(1);

    let btc_price = snapshot
        .bitcoin_usd()
        .map(|p| format_usd(p.get()))
        .unwrap_or_else(|| "Error loading data".to_string());
    table.add_row(vec!["Bitcoin price (USD)".to_string(), btc_price]);

    let stats = snapshot.stats();
    if let Some(change) = stats.change_24h_pct {
        table.add_row(vec!["24h change".to_string(), format_change_pct(change)]);
    }
    if let Some(cap) = stats.market_cap_usd {
        table.add_row(vec!["Market cap".to_string(), format_billions(cap.get())]);
    }
    if let Some(updated) = stats.last_updated_at {
        table.add_row(vec![
            "Last updated".to_string(),
            updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }

    table.add_row(vec![
        "Gold (USD/oz t)".to_string(),
        price_or_unavailable(snapshot.gold_usd_per_troy_ounce()),
    ]);
    table.add_row(vec![
        "Silver (USD/oz t)".to_string(),
        price_or_unavailable(snapshot.silver_usd_per_troy_ounce()),
    ]);

    format!("{}{}\n", table.render(), provenance_line(snapshot))
}

/// Render a conversion outcome; a rejection renders its message instead of a table
pub fn render_conversion(outcome: &Result<ConversionResult, ConversionRejected>) -> String {
    let result = match outcome {
        Ok(result) => result,
        Err(rejected) => return format!("❌ {}\n", rejected),
    };

    let amount_header = format!("{} USD", format_usd(result.usd_amount));
    let mut table = Table::new(vec![amount_header.as_str(), "Equivalent"]);
    table.add_row(vec![
        "Bitcoin (BTC)".to_string(),
        format!("{:.6} BTC", result.bitcoin.btc),
    ]);
    table.add_row(vec![
        "Bitcoin (Sats)".to_string(),
        format!("{} sats", group_thousands(result.bitcoin.satoshis, 3)),
    ]);
    table.add_row(vec!["Gold".to_string(), metal_cell("Gold", &result.gold)]);
    table.add_row(vec!["Silver".to_string(), metal_cell("Silver", &result.silver)]);

    let mut output = table.render();
    if result.source == Provenance::Cached {
        output.push_str(&format!(
            "⚠️ Using cached prices from {}\n",
            result.priced_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    output
}

fn metal_cell(name: &str, outcome: &MetalOutcome) -> String {
    match outcome.amount() {
        Some(amount) => format!("{:.4} oz / {:.2} g", amount.ounces_troy, amount.grams),
        None => format!("Price data unavailable for {}", name),
    }
}

fn price_or_unavailable(price: Option<UsdPrice>) -> String {
    price
        .map(|p| format_usd(p.get()))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn provenance_line(snapshot: &PriceSnapshot) -> String {
    format!(
        "Source: {} ({})",
        snapshot.source(),
        snapshot.captured_at().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversionInput, UpstreamResponse};
    use crate::services::conversion_service::convert;
    use crate::services::normalize_service::normalize_at;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn snapshot(provenance: Provenance) -> PriceSnapshot {
        let raw = UpstreamResponse {
            bitcoin_usd: Some(json!(50_000)),
            gold_usd_per_troy_ounce: Some(json!(2_000)),
            bitcoin_24h_change_pct: Some(json!(1.5)),
            ..Default::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        normalize_at(Some(&raw), provenance, at)
    }

    #[test]
    fn test_conversion_table() {
        let outcome = convert(&snapshot(Provenance::Live), &ConversionInput::from("1000"));
        let rendered = render_conversion(&outcome);
        assert!(rendered.contains("$1,000 USD"));
        assert!(rendered.contains("0.020000 BTC"));
        assert!(rendered.contains("2,000,000 sats"));
        assert!(rendered.contains("0.5000 oz / 15.55 g"));
        assert!(rendered.contains("Price data unavailable for Silver"));
        assert!(!rendered.contains("cached"));
    }

    #[test]
    fn test_tiny_negative_amount_header_has_no_sign() {
        let outcome = convert(&snapshot(Provenance::Live), &ConversionInput::from("-0.001"));
        let rendered = render_conversion(&outcome);
        assert!(rendered.contains("$0 USD"));
        assert!(!rendered.contains("-$0"));
    }

    #[test]
    fn test_cached_conversion_is_labelled() {
        let outcome = convert(&snapshot(Provenance::Cached), &ConversionInput::from("1000"));
        assert!(render_conversion(&outcome).contains("Using cached prices from 2024-05-01 12:00:00 UTC"));
    }

    #[test]
    fn test_rejection_message() {
        let outcome = convert(&snapshot(Provenance::Live), &ConversionInput::from("abc"));
        assert_eq!(render_conversion(&outcome), "❌ Please enter a valid USD amount\n");

        let outcome = convert(&PriceSnapshot::error(Utc::now()), &ConversionInput::from("10"));
        assert!(render_conversion(&outcome).contains("Could not load live prices"));
    }

    #[test]
    fn test_dashboard() {
        let rendered = render_market_dashboard(&snapshot(Provenance::Live));
        assert!(rendered.contains("$50,000"));
        assert!(rendered.contains("+1.50%"));
        assert!(rendered.contains("$2,000"));
        assert!(rendered.contains(UNAVAILABLE));
        assert!(rendered.contains("Source: live"));
        assert!(!rendered.contains("Market cap"));

        let rendered = render_market_dashboard(&PriceSnapshot::error(Utc::now()));
        assert!(rendered.contains("Error loading data"));
        assert!(rendered.contains("Source: error"));
    }
}
