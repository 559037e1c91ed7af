//! Promotions service errors.

use checkout::promotions::{InvalidPromotionCode, InvalidTerms};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::{Classify, ErrorClass, classify_sqlx};

#[derive(Debug, Error)]
pub enum PromotionsServiceError {
    #[error("promotion already exists")]
    AlreadyExists,

    #[error("promotion not found")]
    NotFound,

    #[error("invalid promotion code")]
    InvalidCode(#[from] InvalidPromotionCode),

    #[error("invalid promotion terms")]
    InvalidTerms(#[from] InvalidTerms),

    #[error("invalid data")]
    InvalidData,

    #[error("could not generate an unused code")]
    CodeSpaceExhausted,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromotionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl Classify for PromotionsServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::AlreadyExists => ErrorClass::Conflict,
            Self::NotFound => ErrorClass::NotFound,
            Self::InvalidCode(_) | Self::InvalidTerms(_) | Self::InvalidData => {
                ErrorClass::Validation
            }
            Self::CodeSpaceExhausted => ErrorClass::Transient,
            Self::Sql(error) => classify_sqlx(error),
        }
    }
}
