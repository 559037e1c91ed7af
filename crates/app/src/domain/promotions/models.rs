//! Promotion Models

use checkout::{PromotionCode, PromotionKind, PromotionStatus, PromotionTerms, Rejection};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Marker for promotion identifiers.
#[derive(Debug)]
pub struct PromotionRecord;

/// Promotion UUID
pub type PromotionUuid = TypedUuid<PromotionRecord>;

/// A stored promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub uuid: PromotionUuid,
    pub code: PromotionCode,
    pub terms: PromotionTerms,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Operator input for a new promotion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPromotion {
    /// Generated when omitted.
    #[serde(default)]
    pub code: Option<PromotionCode>,
    pub kind: PromotionKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<u64>,
    /// Defaults to the creation time.
    #[serde(default)]
    pub valid_from: Option<Timestamp>,
    #[serde(default)]
    pub valid_until: Option<Timestamp>,
    #[serde(default)]
    pub status: PromotionStatus,
}

impl NewPromotion {
    /// Terms of the promotion as created at `now`.
    pub fn terms(&self, now: Timestamp) -> PromotionTerms {
        PromotionTerms {
            kind: self.kind,
            value: self.value,
            min_order_amount: self.min_order_amount,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit,
            usage_count: 0,
            valid_from: self.valid_from.unwrap_or(now),
            valid_until: self.valid_until,
            status: self.status,
        }
    }
}

/// Operator edit of a promotion. Usage counts are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromotionUpdate {
    pub kind: PromotionKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<u64>,
    pub valid_from: Timestamp,
    #[serde(default)]
    pub valid_until: Option<Timestamp>,
    pub status: PromotionStatus,
}

impl PromotionUpdate {
    /// Applies the edit on top of `current`, keeping its usage count.
    pub fn apply_to(&self, current: &PromotionTerms) -> PromotionTerms {
        PromotionTerms {
            kind: self.kind,
            value: self.value,
            min_order_amount: self.min_order_amount,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit,
            usage_count: current.usage_count,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            status: self.status,
        }
    }
}

/// Outcome of checking a code against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionValidation {
    /// The code applies and grants `discount`.
    Applied {
        promotion: Promotion,
        discount: Decimal,
    },

    /// The code does not apply.
    Rejected { code: String, reason: Rejection },
}

impl PromotionValidation {
    pub fn discount(&self) -> Decimal {
        match self {
            Self::Applied { discount, .. } => *discount,
            Self::Rejected { .. } => Decimal::ZERO,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
