//! Cart Response Models

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::{
    carts::models::CartLine,
    checkout::models::{CartSummary, ResolvedLine},
    promotions::models::PromotionValidation,
};

use crate::money::{TotalsResponse, amount};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Absent until the first item is added
    pub uuid: Option<Uuid>,

    /// Lines priced at current catalog prices
    pub lines: Vec<CartLineResponse>,

    /// Products that were withdrawn and are not priced
    pub unavailable: Vec<Uuid>,

    /// The applied promotion code and whether it currently applies
    pub promotion: Option<PromotionStatusResponse>,

    /// Price breakdown
    pub totals: TotalsResponse,
}

impl CartResponse {
    pub(crate) fn new(summary: CartSummary, currency: &Currency) -> Self {
        Self {
            uuid: summary.cart_uuid.map(Uuid::from),
            lines: summary
                .lines
                .into_iter()
                .map(CartLineResponse::from)
                .collect(),
            unavailable: summary.unavailable.into_iter().map(Uuid::from).collect(),
            promotion: summary.promotion.map(PromotionStatusResponse::from),
            totals: TotalsResponse::new(&summary.breakdown, currency),
        }
    }
}

/// Cart Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineResponse {
    pub product_uuid: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,

    /// Stock currently on hand
    pub in_stock: u32,
}

impl From<ResolvedLine> for CartLineResponse {
    fn from(line: ResolvedLine) -> Self {
        Self {
            product_uuid: line.product_uuid.into(),
            unit_price: amount(line.unit_price),
            line_total: amount(line.line_total()),
            name: line.name,
            sku: line.sku,
            quantity: line.quantity,
            in_stock: line.stock_quantity,
        }
    }
}

/// Stored quantity of one product.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    pub product_uuid: Uuid,
    pub quantity: u32,
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        Self {
            product_uuid: line.product_uuid.into(),
            quantity: line.quantity,
        }
    }
}

/// Promotion Status Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromotionStatusResponse {
    /// Normalised promotion code
    pub code: String,

    /// Whether the code currently applies
    pub applied: bool,

    /// Discount granted
    pub discount: String,

    /// Machine-readable rejection reason
    pub reason: Option<String>,

    /// Human-readable rejection reason
    pub message: Option<String>,
}

impl From<PromotionValidation> for PromotionStatusResponse {
    fn from(validation: PromotionValidation) -> Self {
        match validation {
            PromotionValidation::Applied {
                promotion,
                discount,
            } => Self {
                code: promotion.code.to_string(),
                applied: true,
                discount: amount(discount),
                reason: None,
                message: None,
            },
            PromotionValidation::Rejected { code, reason } => Self {
                code,
                applied: false,
                discount: amount(Decimal::ZERO),
                reason: Some(reason.as_str().to_string()),
                message: Some(reason.to_string()),
            },
        }
    }
}
