//! Price composition
//!
//! Turns priced cart lines and a discount into a full [`PriceBreakdown`]. Everything here is a
//! pure function of its inputs: composing the same lines twice yields the same figures, down to
//! the last bit of every [`Decimal`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round_money;

/// Flat sales tax rate applied to the discounted subtotal (8%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Orders with a subtotal strictly above this amount ship for free.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Shipping charged when the free-shipping threshold is not exceeded.
pub const DEFAULT_FLAT_SHIPPING: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

/// Tax and shipping parameters used when composing a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Fraction of the taxable amount charged as tax.
    pub tax_rate: Decimal,

    /// Subtotal above which shipping is free.
    pub free_shipping_threshold: Decimal,

    /// Shipping charge at or below the threshold.
    pub flat_shipping: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            flat_shipping: DEFAULT_FLAT_SHIPPING,
        }
    }
}

/// A cart line resolved to its current unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// Unit price at the time of resolution.
    pub unit_price: Decimal,

    /// Quantity, always at least one for a stored cart line.
    pub quantity: u32,
}

impl PricedLine {
    /// Creates a priced line.
    pub const fn new(unit_price: Decimal, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Unit price multiplied by quantity.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Deterministic decomposition of a cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Sum of every line total.
    pub subtotal: Decimal,

    /// Discount actually applied, never above the subtotal.
    pub discount: Decimal,

    /// `max(subtotal - discount, 0)`.
    pub taxable: Decimal,

    /// Tax charged on the taxable amount.
    pub tax: Decimal,

    /// Shipping charge.
    pub shipping: Decimal,

    /// `taxable + tax + shipping`.
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Rounds the breakdown for output.
    ///
    /// Each component is rounded half-up to two places and the taxable amount and total are
    /// then rebuilt from the rounded components, so `total = subtotal - discount + tax +
    /// shipping` holds exactly on the returned figures.
    #[must_use]
    pub fn rounded(&self) -> Self {
        let subtotal = round_money(self.subtotal);
        let discount = round_money(self.discount).min(subtotal);
        let taxable = (subtotal - discount).max(Decimal::ZERO);
        let tax = round_money(self.tax);
        let shipping = round_money(self.shipping);

        Self {
            subtotal,
            discount,
            taxable,
            tax,
            shipping,
            total: taxable + tax + shipping,
        }
    }

    /// Whether `total = subtotal - discount + tax + shipping` and every figure is non-negative.
    pub fn is_consistent(&self) -> bool {
        let non_negative = [
            self.subtotal,
            self.discount,
            self.taxable,
            self.tax,
            self.shipping,
            self.total,
        ]
        .iter()
        .all(|amount| !amount.is_sign_negative() || amount.is_zero());

        non_negative
            && self.discount <= self.subtotal
            && self.total == self.subtotal - self.discount + self.tax + self.shipping
    }
}

/// Sums unit price times quantity over every line.
pub fn subtotal(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(PricedLine::line_total).sum()
}

/// Composes a full price breakdown.
///
/// The discount is clamped into `[0, subtotal]`; shipping is waived only when the
/// pre-discount subtotal exceeds the policy threshold.
pub fn compose(lines: &[PricedLine], discount: Decimal, policy: &PricingPolicy) -> PriceBreakdown {
    let subtotal = subtotal(lines);
    let discount = discount.max(Decimal::ZERO).min(subtotal);
    let taxable = (subtotal - discount).max(Decimal::ZERO);
    let tax = taxable * policy.tax_rate;

    let shipping = if subtotal > policy.free_shipping_threshold {
        Decimal::ZERO
    } else {
        policy.flat_shipping
    };

    PriceBreakdown {
        subtotal,
        discount,
        taxable,
        tax,
        shipping,
        total: taxable + tax + shipping,
    }
}
