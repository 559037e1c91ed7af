//! Order Models

use checkout::{FulfillmentStatus, PaymentStatus, PriceBreakdown};
use rusty_money::iso::Currency;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use checkout_app::domain::orders::models::{Order, OrderLine};

use crate::{
    addresses::AddressBody,
    money::{TotalsResponse, amount},
};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// Human-readable order number
    pub order_number: String,

    /// Fulfilment status
    pub status: String,

    /// Payment status
    pub payment_status: String,

    pub email: String,

    /// Snapshot of the purchased lines
    pub lines: Vec<OrderLineResponse>,

    /// Totals as charged
    pub totals: TotalsResponse,

    pub promotion_code: Option<String>,
    pub shipping_address: AddressBody,
    pub billing_address: AddressBody,
    pub created_at: String,
    pub updated_at: String,
}

impl OrderResponse {
    pub(crate) fn new(order: Order, currency: &Currency) -> Self {
        let breakdown = PriceBreakdown {
            subtotal: order.subtotal,
            discount: order.discount,
            taxable: order.subtotal - order.discount,
            tax: order.tax,
            shipping: order.shipping,
            total: order.total,
        };

        Self {
            uuid: order.uuid.into(),
            status: order.status.to_string(),
            payment_status: order.payment_status.to_string(),
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            totals: TotalsResponse::new(&breakdown, currency),
            promotion_code: order.promotion_code.map(String::from),
            shipping_address: AddressBody::from(&order.shipping_address),
            billing_address: AddressBody::from(&order.billing_address),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
            order_number: order.order_number,
            email: order.email,
        }
    }
}

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    pub product_uuid: Uuid,
    pub product_name: String,
    pub sku: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_uuid: line.product_uuid.into(),
            unit_price: amount(line.unit_price),
            line_total: amount(line.line_total()),
            product_name: line.product_name,
            sku: line.sku,
            quantity: line.quantity,
        }
    }
}

/// Fulfilment Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateStatusRequest {
    /// One of pending, processing, shipped, delivered, cancelled
    #[salvo(schema(value_type = String))]
    pub status: FulfillmentStatus,
}

/// Payment Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdatePaymentStatusRequest {
    /// One of pending, paid, failed, refunded
    #[salvo(schema(value_type = String))]
    pub payment_status: PaymentStatus,
}
