//! Order errors.

use checkout::InvalidTransition;
use thiserror::Error;

use crate::{
    domain::catalog::models::ProductUuid,
    errors::{Classify, ErrorClass, classify_sqlx, unique_violation},
};

/// Unique constraint guarding idempotency keys.
pub const IDEMPOTENCY_KEY_CONSTRAINT: &str = "orders_idempotency_key_key";

/// Unique constraint guarding order numbers.
pub const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

/// Failures while reading or committing orders.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient stock for product {product}")]
    InsufficientStock { product: ProductUuid },

    #[error("product {product} is no longer available")]
    ProductUnavailable { product: ProductUuid },

    #[error("promotion usage limit reached")]
    UsageLimitReached,

    #[error("promotion is no longer redeemable")]
    PromotionUnavailable,

    #[error("an order already exists for this idempotency key")]
    DuplicateIdempotencyKey,

    #[error("order number already taken")]
    DuplicateOrderNumber,

    #[error("stored order is invalid")]
    Corrupt(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for LedgerError {
    fn from(error: sqlx::Error) -> Self {
        match unique_violation(&error) {
            Some(IDEMPOTENCY_KEY_CONSTRAINT) => Self::DuplicateIdempotencyKey,
            Some(ORDER_NUMBER_CONSTRAINT) => Self::DuplicateOrderNumber,
            _ => Self::Sql(error),
        }
    }
}

impl Classify for LedgerError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InsufficientStock { .. }
            | Self::ProductUnavailable { .. }
            | Self::UsageLimitReached
            | Self::PromotionUnavailable
            | Self::DuplicateIdempotencyKey => ErrorClass::Conflict,
            Self::DuplicateOrderNumber => ErrorClass::Transient,
            Self::Corrupt(_) => ErrorClass::Fatal,
            Self::Sql(error) => classify_sqlx(error),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("order was changed concurrently; refresh and retry")]
    ConcurrentUpdate,

    #[error("order storage failed")]
    Ledger(#[from] LedgerError),
}

impl Classify for OrdersServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound => ErrorClass::NotFound,
            Self::InvalidTransition(_) => ErrorClass::Policy,
            Self::ConcurrentUpdate => ErrorClass::Conflict,
            Self::Ledger(error) => error.class(),
        }
    }
}
