//! Checkout
//!
//! Cart summaries, promotion application and order finalization.

pub mod errors;
pub mod models;
pub mod payment;
pub mod service;
pub mod settings;

pub use errors::{CheckoutError, FinalizeError};
pub use payment::*;
pub use service::*;
pub use settings::CheckoutSettings;
