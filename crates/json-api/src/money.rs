//! Money in responses
//!
//! Amounts leave the API as two-decimal strings so clients never see binary floats.

use checkout::{
    PriceBreakdown,
    money::{format_money, to_output_string},
};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Renders an amount for output.
pub(crate) fn amount(value: Decimal) -> String {
    to_output_string(value)
}

/// Price breakdown as shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct TotalsResponse {
    /// Sum of the line totals
    pub subtotal: String,

    /// Promotion discount
    pub discount: String,

    /// Tax on the discounted subtotal
    pub tax: String,

    /// Shipping charge
    pub shipping: String,

    /// Amount to pay
    pub total: String,

    /// ISO 4217 currency code
    pub currency: String,

    /// Total with currency symbol, for display only
    pub formatted_total: String,
}

impl TotalsResponse {
    pub(crate) fn new(breakdown: &PriceBreakdown, currency: &Currency) -> Self {
        Self {
            subtotal: amount(breakdown.subtotal),
            discount: amount(breakdown.discount),
            tax: amount(breakdown.tax),
            shipping: amount(breakdown.shipping),
            total: amount(breakdown.total),
            currency: currency.iso_alpha_code.to_string(),
            formatted_total: format_money(breakdown.total, currency),
        }
    }
}
