//! Promotions

use checkout::PromotionCode;
use salvo::prelude::StatusError;

use crate::extensions::*;

pub(crate) mod handlers;
pub(crate) mod models;

/// Parses a promotion code taken from a request path.
pub(crate) fn parse_code(raw: &str) -> Result<PromotionCode, StatusError> {
    PromotionCode::parse(raw).or_400("invalid promotion code")
}
