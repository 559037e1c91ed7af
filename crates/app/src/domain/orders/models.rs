//! Order Models

use checkout::{Address, FulfillmentStatus, PaymentStatus, PriceBreakdown, PromotionCode};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    domain::{catalog::models::ProductUuid, identity::UserUuid, promotions::models::PromotionUuid},
    uuids::TypedUuid,
};

/// Marker for order identifiers.
#[derive(Debug)]
pub struct OrderRecord;

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Marker for order line identifiers.
#[derive(Debug)]
pub struct OrderLineRecord;

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLineRecord>;

/// Snapshot of a purchased product. Never changes after the order is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub uuid: OrderLineUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub sku: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A finalized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub uuid: OrderUuid,
    pub order_number: String,
    #[serde(skip)]
    pub idempotency_key: String,
    /// Storage key of the cart owner; idempotency keys are unique per owner.
    #[serde(skip)]
    pub owner_key: String,
    pub user_uuid: Option<UserUuid>,
    pub email: String,
    pub status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub promotion_uuid: Option<PromotionUuid>,
    pub promotion_code: Option<PromotionCode>,
    pub payment_reference: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Copies the output figures of a rounded breakdown onto the order.
    pub fn set_totals(&mut self, breakdown: &PriceBreakdown) {
        self.subtotal = breakdown.subtotal;
        self.discount = breakdown.discount;
        self.tax = breakdown.tax;
        self.shipping = breakdown.shipping;
        self.total = breakdown.total;
    }

    /// Whether the stored totals satisfy `total = subtotal - discount + tax + shipping`.
    pub fn totals_are_consistent(&self) -> bool {
        self.total >= Decimal::ZERO
            && self.discount <= self.subtotal
            && self.total == self.subtotal - self.discount + self.tax + self.shipping
    }
}
