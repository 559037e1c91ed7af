//! Checkout settings.

use std::time::Duration;

use checkout::PricingPolicy;
use rust_decimal::Decimal;

/// Tunables for pricing and finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub policy: PricingPolicy,

    /// Upper bound on a whole finalization, retries included.
    pub timeout: Duration,

    /// Attempts made when a finalization hits a transient failure.
    pub max_attempts: u32,

    /// Delay before the second attempt; later attempts wait proportionally longer.
    pub retry_backoff: Duration,

    /// Largest accepted difference between the client's expected total and the real one.
    pub price_tolerance: Decimal,

    /// How long a checkout transaction waits on a row lock.
    pub lock_timeout: Duration,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            policy: PricingPolicy::default(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(50),
            price_tolerance: Decimal::new(1, 2),
            lock_timeout: Duration::from_secs(2),
        }
    }
}
