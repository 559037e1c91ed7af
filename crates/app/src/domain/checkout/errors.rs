//! Checkout errors.

use checkout::Rejection;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    domain::{
        carts::CartsServiceError,
        catalog::{CatalogError, models::ProductUuid},
        checkout::payment::PaymentError,
        orders::LedgerError,
        promotions::PromotionsServiceError,
    },
    errors::{Classify, ErrorClass},
};

/// Failures while summarising a cart or applying a promotion.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error("catalog lookup failed")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Promotions(#[from] PromotionsServiceError),
}

impl Classify for CheckoutError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyCart => ErrorClass::Validation,
            Self::Carts(error) => error.class(),
            Self::Catalog(error) => error.class(),
            Self::Promotions(error) => error.class(),
        }
    }
}

/// Why a cart could not be turned into an order.
#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("a valid email address is required")]
    InvalidEmail,

    #[error("an idempotency key is required")]
    MissingIdempotencyKey,

    #[error("a payment token is required")]
    MissingPaymentToken,

    #[error("product {product} is no longer available; refresh the cart")]
    StaleCart { product: ProductUuid },

    #[error("promotion cannot be applied: {0}")]
    PromotionInvalid(Rejection),

    #[error("promotion usage limit reached; refresh and retry")]
    UsageLimitReached,

    #[error("price changed from {expected} to {actual}; refresh and retry")]
    PriceMismatch { expected: Decimal, actual: Decimal },

    #[error("insufficient stock for product {product}")]
    InsufficientStock { product: ProductUuid },

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("payment provider unavailable")]
    PaymentUnavailable(#[source] PaymentError),

    #[error("order totals are inconsistent")]
    InconsistentTotals,

    #[error("finalization timed out")]
    Timeout,

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error("catalog lookup failed")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Promotions(#[from] PromotionsServiceError),

    #[error("order storage failed")]
    Ledger(#[source] LedgerError),
}

impl From<LedgerError> for FinalizeError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::InsufficientStock { product } => Self::InsufficientStock { product },
            LedgerError::ProductUnavailable { product } => Self::StaleCart { product },
            LedgerError::UsageLimitReached => Self::UsageLimitReached,
            LedgerError::PromotionUnavailable => Self::PromotionInvalid(Rejection::Inactive),
            other => Self::Ledger(other),
        }
    }
}

impl From<PaymentError> for FinalizeError {
    fn from(error: PaymentError) -> Self {
        match error {
            PaymentError::Declined(reason) => Self::PaymentDeclined(reason),
            unavailable @ PaymentError::Unavailable(_) => Self::PaymentUnavailable(unavailable),
        }
    }
}

impl Classify for FinalizeError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyCart
            | Self::InvalidEmail
            | Self::MissingIdempotencyKey
            | Self::MissingPaymentToken => ErrorClass::Validation,
            Self::PromotionInvalid(_) | Self::PaymentDeclined(_) => ErrorClass::Policy,
            Self::StaleCart { .. }
            | Self::UsageLimitReached
            | Self::PriceMismatch { .. }
            | Self::InsufficientStock { .. } => ErrorClass::Conflict,
            Self::PaymentUnavailable(_) | Self::Timeout => ErrorClass::Transient,
            Self::InconsistentTotals => ErrorClass::Fatal,
            Self::Carts(error) => error.class(),
            Self::Catalog(error) => error.class(),
            Self::Promotions(error) => error.class(),
            Self::Ledger(error) => error.class(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_conflicts_map_to_finalize_conflicts() {
        let product = ProductUuid::new();

        assert!(matches!(
            FinalizeError::from(LedgerError::InsufficientStock { product }),
            FinalizeError::InsufficientStock { .. }
        ));
        assert!(matches!(
            FinalizeError::from(LedgerError::ProductUnavailable { product }),
            FinalizeError::StaleCart { .. }
        ));
        assert_eq!(
            FinalizeError::from(LedgerError::UsageLimitReached).class(),
            ErrorClass::Conflict
        );
    }

    #[test]
    fn duplicate_order_numbers_are_retryable() {
        assert!(
            FinalizeError::from(LedgerError::DuplicateOrderNumber)
                .class()
                .is_retryable()
        );
    }

    #[test]
    fn declines_are_policy_failures() {
        assert_eq!(
            FinalizeError::from(PaymentError::Declined("no".to_string())).class(),
            ErrorClass::Policy
        );
    }
}
