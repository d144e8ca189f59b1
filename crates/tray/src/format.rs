//! Rendering of reward amounts and period-over-period deltas.

/// Fixed-point scale of the oracle price: 1 USD == 1e8.
pub const PRICE_SCALE: f64 = 100_000_000.0;

/// Display unit for reward amounts, toggled from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    Hnt,
    Usd,
}

/// Render a native reward amount with two decimals. With [`DisplayUnit::Usd`]
/// the amount is converted through the fixed-point oracle price first.
pub fn format_amount(amount: f64, unit: DisplayUnit, price: u64) -> String {
    match unit {
        DisplayUnit::Usd => format!("{:.2} USD", amount * (price as f64 / PRICE_SCALE)),
        DisplayUnit::Hnt => format!("{amount:.2} HNT"),
    }
}

/// Render a delta as a percentage of the previous period, e.g. "/ +12.50%".
///
/// Returns the empty string when the previous period is zero (the division
/// yields inf or NaN), so sub-day-old hotspots show no percentage at all.
/// Positive values carry an explicit `+`; negative values already carry the
/// sign in the numeral.
pub fn percent_delta(delta: f64, previous: f64) -> String {
    let percent = (delta / previous) * 100.0;
    if !percent.is_finite() {
        return String::new();
    }
    if percent > 0.0 {
        format!("/ +{percent:.2}%")
    } else {
        format!("/ {percent:.2}%")
    }
}
