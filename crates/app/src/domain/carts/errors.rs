//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::catalog::CatalogError,
    errors::{Classify, ErrorClass, classify_sqlx},
};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("product not found")]
    ProductNotFound,

    #[error("product is not available")]
    ProductUnavailable,

    #[error("only {available} in stock")]
    InsufficientStock { available: u32 },

    #[error("cart line not found")]
    LineNotFound,

    #[error("catalog lookup failed")]
    Catalog(#[source] CatalogError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::LineNotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::ProductNotFound,
            Some(ErrorKind::CheckViolation) => Self::InvalidQuantity,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<CatalogError> for CartsServiceError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound => Self::ProductNotFound,
            other @ CatalogError::Sql(_) => Self::Catalog(other),
        }
    }
}

impl Classify for CartsServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidQuantity => ErrorClass::Validation,
            Self::ProductNotFound | Self::LineNotFound => ErrorClass::NotFound,
            Self::ProductUnavailable | Self::InsufficientStock { .. } => ErrorClass::Policy,
            Self::Catalog(error) => error.class(),
            Self::Sql(error) => classify_sqlx(error),
        }
    }
}
