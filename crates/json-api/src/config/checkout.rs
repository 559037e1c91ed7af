//! Checkout Config

use std::time::Duration;

use checkout::{
    PricingPolicy,
    pricing::{DEFAULT_FLAT_SHIPPING, DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_TAX_RATE},
};
use checkout_app::domain::checkout::CheckoutSettings;
use clap::Args;
use rust_decimal::Decimal;

/// Pricing and finalization settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Sales tax rate applied to the discounted subtotal
    #[arg(long, env = "TAX_RATE", default_value_t = DEFAULT_TAX_RATE)]
    pub tax_rate: Decimal,

    /// Subtotal above which shipping is free
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD", default_value_t = DEFAULT_FREE_SHIPPING_THRESHOLD)]
    pub free_shipping_threshold: Decimal,

    /// Shipping charged at or below the free-shipping threshold
    #[arg(long, env = "FLAT_SHIPPING", default_value_t = DEFAULT_FLAT_SHIPPING)]
    pub flat_shipping: Decimal,

    /// ISO 4217 currency used for formatted amounts
    #[arg(long, env = "CURRENCY", default_value = "KES")]
    pub currency: String,

    /// Upper bound on a whole finalization, in milliseconds
    #[arg(long, env = "FINALIZE_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub finalize_timeout_ms: u64,

    /// Attempts made when finalization hits a transient failure
    #[arg(long, env = "FINALIZE_ATTEMPTS", default_value_t = 3_u32)]
    pub finalize_attempts: u32,

    /// Base delay between finalization attempts, in milliseconds
    #[arg(long, env = "FINALIZE_BACKOFF_MS", default_value_t = 50_u64)]
    pub finalize_backoff_ms: u64,

    /// Largest accepted difference between the shown and the real total
    #[arg(long, env = "PRICE_TOLERANCE", default_value = "0.01")]
    pub price_tolerance: Decimal,

    /// How long a checkout transaction waits on a row lock, in milliseconds
    #[arg(long, env = "LOCK_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub lock_timeout_ms: u64,
}

impl CheckoutConfig {
    /// Settings handed to the checkout service.
    pub fn settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            policy: PricingPolicy {
                tax_rate: self.tax_rate,
                free_shipping_threshold: self.free_shipping_threshold,
                flat_shipping: self.flat_shipping,
            },
            timeout: Duration::from_millis(self.finalize_timeout_ms),
            max_attempts: self.finalize_attempts.max(1),
            retry_backoff: Duration::from_millis(self.finalize_backoff_ms),
            price_tolerance: self.price_tolerance,
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }
}
