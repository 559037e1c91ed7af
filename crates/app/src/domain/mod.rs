//! Checkout Domain Concerns

pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod identity;
pub mod orders;
pub mod promotions;
