use crate::models::{
    BitcoinAmount, ConversionInput, ConversionRejected, ConversionResult, MetalAmount,
    MetalOutcome, PriceSnapshot, RejectReason, UsdPrice, GRAMS_PER_TROY_OUNCE, SATOSHIS_PER_BTC,
};

/// Resolve the UI amount to a finite USD value
pub fn parse_amount(input: &ConversionInput) -> Result<f64, RejectReason> {
    let amount = match input {
        ConversionInput::Amount(amount) => *amount,
        ConversionInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(RejectReason::InvalidAmount);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| RejectReason::InvalidAmount)?
        }
    };

    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(RejectReason::InvalidAmount)
    }
}

/// Convert a USD amount into Bitcoin, gold and silver at snapshot prices.
///
/// The amount is validated before the snapshot is looked at. Bitcoin is the
/// mandatory baseline; a missing metal price only makes that metal unavailable.
/// Outputs are full precision, rounding is left to the display layer.
pub fn convert(
    snapshot: &PriceSnapshot,
    input: &ConversionInput,
) -> Result<ConversionResult, ConversionRejected> {
    let usd_amount = parse_amount(input)?;

    let bitcoin_usd = snapshot
        .bitcoin_usd()
        .ok_or(RejectReason::MarketDataUnavailable)?;

    let bitcoin = convert_bitcoin(usd_amount, bitcoin_usd).ok_or(RejectReason::InvalidAmount)?;

    Ok(ConversionResult {
        usd_amount,
        bitcoin,
        gold: convert_metal(usd_amount, snapshot.gold_usd_per_troy_ounce()),
        silver: convert_metal(usd_amount, snapshot.silver_usd_per_troy_ounce()),
        source: snapshot.source(),
        priced_at: snapshot.captured_at(),
    })
}

/// `None` when the amount is too large to represent at this price
fn convert_bitcoin(usd_amount: f64, price: UsdPrice) -> Option<BitcoinAmount> {
    let btc = usd_amount / price.get();
    let satoshis = btc * SATOSHIS_PER_BTC;
    (btc.is_finite() && satoshis.is_finite()).then_some(BitcoinAmount { btc, satoshis })
}

fn convert_metal(usd_amount: f64, price: Option<UsdPrice>) -> MetalOutcome {
    let Some(price) = price else {
        return MetalOutcome::Unavailable;
    };

    let ounces_troy = usd_amount / price.get();
    let grams = ounces_troy * GRAMS_PER_TROY_OUNCE;
    if ounces_troy.is_finite() && grams.is_finite() {
        MetalOutcome::Available(MetalAmount { ounces_troy, grams })
    } else {
        MetalOutcome::Unavailable
    }
}
