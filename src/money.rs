//! Money

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};

/// Number of decimal places used for every amount leaving the engine.
pub const OUTPUT_SCALE: u32 = 2;

/// Rounds an amount to two decimal places, half away from zero.
///
/// Only call this at an output boundary; intermediate values keep full precision.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(OUTPUT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount with the symbol and separators of the given currency.
pub fn format_money(amount: Decimal, currency: &iso::Currency) -> String {
    Money::from_decimal(round_money(amount), currency).to_string()
}

/// Looks up an ISO 4217 currency by its alphabetic code (case-insensitive).
pub fn find_currency(code: &str) -> Option<&'static iso::Currency> {
    iso::find(&code.trim().to_ascii_uppercase())
}

/// Renders an amount as a plain two-decimal string, e.g. `"34.29"`.
pub fn to_output_string(amount: Decimal) -> String {
    let mut rounded = round_money(amount);

    rounded.rescale(OUTPUT_SCALE);

    rounded.to_string()
}
