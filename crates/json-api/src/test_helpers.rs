//! Test helpers.

use std::sync::Arc;

use checkout::{
    Address, AddressError, FulfillmentStatus, PaymentStatus, PriceBreakdown, PricedLine, PricingPolicy,
    PromotionCode, PromotionKind, PromotionStatus, PromotionTerms, UnvalidatedAddress, compose,
    promotions::InvalidPromotionCode,
};
use checkout_app::{
    context::AppContext,
    domain::{
        carts::{MockCartsService, models::CartOwner},
        catalog::models::ProductUuid,
        checkout::{
            MockCheckoutService,
            models::{CartSummary, ResolvedLine},
        },
        identity::{InvalidSessionToken, SessionToken},
        orders::{
            MockOrdersService,
            models::{Order, OrderLine, OrderLineUuid, OrderUuid},
        },
        promotions::{
            MockPromotionsService,
            models::{Promotion, PromotionUuid},
        },
    },
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};

use crate::{identity, operator, state::State};

pub(crate) const TEST_SESSION: &str = "test-session";

pub(crate) const TEST_OPERATOR_TOKEN: &str = "operator-secret";

/// One strict mock per service; any call without an expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) carts: MockCartsService,
    pub(crate) promotions: MockPromotionsService,
    pub(crate) checkout: MockCheckoutService,
    pub(crate) orders: MockOrdersService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> State {
        State::new(AppContext {
            carts: Arc::new(self.carts),
            promotions: Arc::new(self.promotions),
            checkout: Arc::new(self.checkout),
            orders: Arc::new(self.orders),
        })
        .with_operator_token(Some(TEST_OPERATOR_TOKEN.to_string()))
    }
}

pub(crate) fn strict_state() -> State {
    Mocks::default().into_state()
}

/// Shopper routes behind the identity middleware.
pub(crate) fn shopper_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state().into_shared()))
            .hoop(identity::middleware::handler)
            .push(route),
    )
}

/// Operator routes behind the operator middleware.
pub(crate) fn operator_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state().into_shared()))
            .hoop(operator::middleware::handler)
            .push(route),
    )
}

pub(crate) fn bearer() -> String {
    format!("Bearer {TEST_OPERATOR_TOKEN}")
}

pub(crate) fn guest_owner() -> Result<CartOwner, InvalidSessionToken> {
    SessionToken::parse(TEST_SESSION).map(CartOwner::Guest)
}

pub(crate) fn make_address() -> Result<Address, AddressError> {
    let raw = UnvalidatedAddress {
        name: "Wanjiru Kamau".to_string(),
        line1: "12 Moi Avenue".to_string(),
        city: "Nairobi".to_string(),
        postal_code: "00100".to_string(),
        country: "ke".to_string(),
        ..UnvalidatedAddress::default()
    };

    Address::parse(&raw)
}

pub(crate) fn make_line(product: ProductUuid, unit_price: Decimal, quantity: u32) -> ResolvedLine {
    ResolvedLine {
        product_uuid: product,
        name: format!("Product {product}"),
        sku: None,
        unit_price,
        quantity,
        stock_quantity: 10,
    }
}

fn breakdown_for(lines: &[ResolvedLine], discount: Decimal) -> PriceBreakdown {
    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|line| PricedLine::new(line.unit_price, line.quantity))
        .collect();

    compose(&priced, discount, &PricingPolicy::default()).rounded()
}

/// A summary of the given lines without a promotion.
pub(crate) fn make_summary(lines: Vec<ResolvedLine>) -> CartSummary {
    let breakdown = breakdown_for(&lines, Decimal::ZERO);

    CartSummary {
        cart_uuid: None,
        lines,
        unavailable: Vec::new(),
        promotion: None,
        breakdown,
    }
}

pub(crate) fn make_promotion(code: &str) -> Result<Promotion, InvalidPromotionCode> {
    Ok(Promotion {
        code: PromotionCode::parse(code)?,
        uuid: PromotionUuid::new(),
        terms: PromotionTerms {
            kind: PromotionKind::Percentage,
            value: Decimal::from(10),
            min_order_amount: None,
            max_discount: None,
            usage_limit: Some(100),
            usage_count: 3,
            valid_from: Timestamp::UNIX_EPOCH,
            valid_until: None,
            status: PromotionStatus::Active,
        },
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    })
}

/// A pending order for two of a 10.00 product and one of a 5.00 product.
pub(crate) fn make_order(uuid: OrderUuid) -> Result<Order, AddressError> {
    let lines = vec![
        OrderLine {
            uuid: OrderLineUuid::new(),
            product_uuid: ProductUuid::new(),
            product_name: "Mug".to_string(),
            sku: Some("MUG-1".to_string()),
            unit_price: Decimal::from(10),
            quantity: 2,
        },
        OrderLine {
            uuid: OrderLineUuid::new(),
            product_uuid: ProductUuid::new(),
            product_name: "Coaster".to_string(),
            sku: None,
            unit_price: Decimal::from(5),
            quantity: 1,
        },
    ];

    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|line| PricedLine::new(line.unit_price, line.quantity))
        .collect();

    let mut order = Order {
        uuid,
        order_number: "KN261018ABC123".to_string(),
        idempotency_key: "key-1".to_string(),
        owner_key: "guest:session-1".to_string(),
        user_uuid: None,
        email: "shopper@example.com".to_string(),
        status: FulfillmentStatus::Pending,
        payment_status: PaymentStatus::Pending,
        subtotal: Decimal::ZERO,
        discount: Decimal::ZERO,
        tax: Decimal::ZERO,
        shipping: Decimal::ZERO,
        total: Decimal::ZERO,
        shipping_address: make_address()?,
        billing_address: make_address()?,
        promotion_uuid: None,
        promotion_code: None,
        payment_reference: Some("auth_test".to_string()),
        lines,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    };

    order.set_totals(&compose(&priced, Decimal::ZERO, &PricingPolicy::default()).rounded());

    Ok(order)
}
