//! Checkout
//!
//! Checkout is the pure core of a cart-to-order engine: promotion rules, deterministic price
//! composition and the order lifecycle, with no storage or I/O of its own.

pub mod address;
pub mod money;
pub mod orders;
pub mod pricing;
pub mod promotions;

pub use address::{Address, AddressError, UnvalidatedAddress};
pub use orders::{FulfillmentStatus, InvalidTransition, PaymentStatus};
pub use pricing::{PriceBreakdown, PricedLine, PricingPolicy, compose};
pub use promotions::{PromotionCode, PromotionKind, PromotionStatus, PromotionTerms, Rejection};
