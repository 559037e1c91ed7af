//! Promotion Models

use checkout::{PromotionKind, PromotionStatus};
use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::promotions::models::{NewPromotion, Promotion, PromotionUpdate};

use crate::{money::amount, promotions::parse_code};

/// Promotion Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromotionResponse {
    pub uuid: Uuid,
    pub code: String,

    /// percentage or fixed
    pub kind: String,

    /// Percent or amount, depending on the kind
    pub value: String,

    pub min_order_amount: Option<String>,
    pub max_discount: Option<String>,
    pub usage_limit: Option<u64>,
    pub usage_count: u64,
    pub valid_from: String,
    pub valid_until: Option<String>,

    /// active, inactive or expired
    pub status: String,

    pub created_at: String,
    pub updated_at: String,
}

impl From<Promotion> for PromotionResponse {
    fn from(promotion: Promotion) -> Self {
        let terms = promotion.terms;

        Self {
            uuid: promotion.uuid.into(),
            code: promotion.code.to_string(),
            kind: terms.kind.as_str().to_string(),
            value: terms.value.normalize().to_string(),
            min_order_amount: terms.min_order_amount.map(amount),
            max_discount: terms.max_discount.map(amount),
            usage_limit: terms.usage_limit,
            usage_count: terms.usage_count,
            valid_from: terms.valid_from.to_string(),
            valid_until: terms.valid_until.as_ref().map(ToString::to_string),
            status: terms.status.as_str().to_string(),
            created_at: promotion.created_at.to_string(),
            updated_at: promotion.updated_at.to_string(),
        }
    }
}

/// Create Promotion Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreatePromotionRequest {
    /// Generated when omitted
    #[serde(default)]
    pub code: Option<String>,

    /// percentage or fixed
    #[salvo(schema(value_type = String))]
    pub kind: PromotionKind,

    #[salvo(schema(value_type = String))]
    pub value: Decimal,

    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub min_order_amount: Option<Decimal>,

    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub max_discount: Option<Decimal>,

    #[serde(default)]
    pub usage_limit: Option<u64>,

    /// RFC 3339 timestamp; defaults to now
    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub valid_from: Option<Timestamp>,

    /// RFC 3339 timestamp
    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub valid_until: Option<Timestamp>,

    /// Defaults to active
    #[serde(default)]
    #[salvo(schema(value_type = String))]
    pub status: PromotionStatus,
}

impl CreatePromotionRequest {
    pub(crate) fn into_new_promotion(self) -> Result<NewPromotion, StatusError> {
        Ok(NewPromotion {
            code: self.code.as_deref().map(parse_code).transpose()?,
            kind: self.kind,
            value: self.value,
            min_order_amount: self.min_order_amount,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            status: self.status,
        })
    }
}

/// Update Promotion Request
///
/// Replaces the terms; the usage count is kept.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdatePromotionRequest {
    #[salvo(schema(value_type = String))]
    pub kind: PromotionKind,

    #[salvo(schema(value_type = String))]
    pub value: Decimal,

    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub min_order_amount: Option<Decimal>,

    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub max_discount: Option<Decimal>,

    #[serde(default)]
    pub usage_limit: Option<u64>,

    #[salvo(schema(value_type = String))]
    pub valid_from: Timestamp,

    #[serde(default)]
    #[salvo(schema(value_type = Option<String>))]
    pub valid_until: Option<Timestamp>,

    #[salvo(schema(value_type = String))]
    pub status: PromotionStatus,
}

impl From<UpdatePromotionRequest> for PromotionUpdate {
    fn from(request: UpdatePromotionRequest) -> Self {
        Self {
            kind: request.kind,
            value: request.value,
            min_order_amount: request.min_order_amount,
            max_discount: request.max_discount,
            usage_limit: request.usage_limit,
            valid_from: request.valid_from,
            valid_until: request.valid_until,
            status: request.status,
        }
    }
}
