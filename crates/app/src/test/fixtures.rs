//! Test fixtures

use checkout::{
    Address, AddressError, FulfillmentStatus, PaymentStatus, UnvalidatedAddress, pricing,
    PricedLine, PricingPolicy,
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    catalog::models::{CatalogProduct, ProductStatus, ProductUuid},
    checkout::models::FinalizeRequest,
    orders::models::{Order, OrderLine, OrderLineUuid, OrderUuid},
};

pub(crate) fn product(uuid: ProductUuid, price: Decimal, stock: u32) -> CatalogProduct {
    CatalogProduct {
        uuid,
        name: format!("Product {uuid}"),
        sku: None,
        price,
        stock_quantity: stock,
        status: ProductStatus::Active,
    }
}

pub(crate) fn address() -> Result<Address, AddressError> {
    Address::parse(&UnvalidatedAddress {
        name: "Ada Lovelace".to_string(),
        line1: "12 Analytical Row".to_string(),
        line2: None,
        city: "London".to_string(),
        state: None,
        postal_code: "N1 7GU".to_string(),
        country: "gb".to_string(),
        phone: None,
    })
}

pub(crate) fn finalize_request(
    expected_total: Decimal,
    idempotency_key: &str,
) -> Result<FinalizeRequest, AddressError> {
    Ok(FinalizeRequest {
        expected_total,
        shipping_address: address()?,
        billing_address: None,
        email: "ada@example.com".to_string(),
        payment_token: "tok_visa".to_string(),
        idempotency_key: idempotency_key.to_string(),
    })
}

/// A pending two-line order priced with the default policy.
pub(crate) fn sample_order() -> Result<Order, AddressError> {
    let now = Timestamp::now();
    let suffix = Uuid::now_v7().simple().to_string();

    let lines = vec![
        OrderLine {
            uuid: OrderLineUuid::new(),
            product_uuid: ProductUuid::new(),
            product_name: "Widget".to_string(),
            sku: Some("W-1".to_string()),
            unit_price: Decimal::from(10),
            quantity: 2,
        },
        OrderLine {
            uuid: OrderLineUuid::new(),
            product_uuid: ProductUuid::new(),
            product_name: "Gadget".to_string(),
            sku: None,
            unit_price: Decimal::from(5),
            quantity: 1,
        },
    ];

    let priced: Vec<_> = lines
        .iter()
        .map(|line| PricedLine::new(line.unit_price, line.quantity))
        .collect();

    let shipping_address = address()?;

    let mut order = Order {
        uuid: OrderUuid::new(),
        order_number: format!("KN{}", suffix.get(20..).unwrap_or(&suffix).to_ascii_uppercase()),
        idempotency_key: format!("key-{suffix}"),
        owner_key: format!("guest:{suffix}"),
        user_uuid: None,
        email: "ada@example.com".to_string(),
        status: FulfillmentStatus::Pending,
        payment_status: PaymentStatus::Paid,
        subtotal: Decimal::ZERO,
        discount: Decimal::ZERO,
        tax: Decimal::ZERO,
        shipping: Decimal::ZERO,
        total: Decimal::ZERO,
        billing_address: shipping_address.clone(),
        shipping_address,
        promotion_uuid: None,
        promotion_code: None,
        payment_reference: Some("auth_test".to_string()),
        lines,
        created_at: now,
        updated_at: now,
    };

    order.set_totals(
        &pricing::compose(&priced, Decimal::ZERO, &PricingPolicy::default()).rounded(),
    );

    Ok(order)
}
