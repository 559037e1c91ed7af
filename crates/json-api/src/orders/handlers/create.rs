//! Checkout Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use checkout_app::domain::checkout::models::FinalizeRequest;

use crate::{
    addresses::AddressBody, errors::into_status_error, extensions::*,
    orders::models::OrderResponse, state::State,
};

/// Header accepted in place of the `idempotency_key` body field.
pub(crate) const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    /// Total the shopper was shown, as a decimal string
    #[salvo(schema(value_type = String))]
    pub expected_total: Decimal,

    pub shipping_address: AddressBody,

    /// Defaults to the shipping address
    #[serde(default)]
    pub billing_address: Option<AddressBody>,

    pub email: String,

    /// Opaque token from the payment provider
    pub payment_token: String,

    /// Client-chosen key; repeating a request with the same key returns the same order
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl CheckoutRequest {
    fn into_finalize_request(
        self,
        header_key: Option<String>,
    ) -> Result<FinalizeRequest, StatusError> {
        let billing_address = self
            .billing_address
            .map(|address| address.into_address("billing_address"))
            .transpose()?;

        Ok(FinalizeRequest {
            expected_total: self.expected_total,
            shipping_address: self.shipping_address.into_address("shipping_address")?,
            billing_address,
            email: self.email,
            payment_token: self.payment_token,
            idempotency_key: self.idempotency_key.or(header_key).unwrap_or_default(),
        })
    }
}

/// Checkout Handler
///
/// Turns the shopper's cart into an order. Conflicts mean the cart, prices or stock changed;
/// refresh the cart and retry with the same idempotency key.
#[endpoint(
    tags("checkout"),
    summary = "Place Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid request or empty cart"),
        (status_code = StatusCode::CONFLICT, description = "Cart, price, stock or promotion changed"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Payment declined or promotion invalid"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Temporary failure; retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "checkout.finalize",
    skip(req, json, depot, res),
    fields(order_uuid = tracing::field::Empty, order_number = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    req: &mut Request,
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let request = json
        .into_inner()
        .into_finalize_request(req.header::<String>(IDEMPOTENCY_KEY_HEADER))?;

    let order = state
        .app
        .checkout
        .finalize(&owner, request)
        .await
        .map_err(into_status_error)?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order.uuid));
    span.record("order_number", order.order_number.as_str());

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(OrderResponse::new(order, state.currency)))
}

#[cfg(test)]
mod tests {
    use checkout_app::domain::{
        checkout::FinalizeError,
        orders::models::OrderUuid,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{
        identity::SESSION_TOKEN_HEADER,
        test_helpers::{Mocks, TEST_SESSION, guest_owner, make_order, shopper_service},
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        shopper_service(mocks, Router::with_path("checkout").post(handler))
    }

    fn body() -> Value {
        json!({
            "expected_total": "36.99",
            "shipping_address": {
                "name": "Wanjiru Kamau",
                "line1": "12 Moi Avenue",
                "city": "Nairobi",
                "postal_code": "00100",
                "country": "ke"
            },
            "email": "shopper@example.com",
            "payment_token": "tok_visa",
            "idempotency_key": "key-1"
        })
    }

    #[tokio::test]
    async fn test_checkout_returns_201_with_order() -> TestResult {
        let owner = guest_owner()?;
        let uuid = OrderUuid::new();
        let order = make_order(uuid)?;

        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_finalize()
            .once()
            .withf(move |o, request| {
                *o == owner
                    && request.expected_total == Decimal::new(3699, 2)
                    && request.idempotency_key == "key-1"
                    && request.billing_address.is_none()
                    && request.shipping_address.country() == "KE"
            })
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&body())
            .send(&make_service(mocks))
            .await;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{uuid}")));

        let order: OrderResponse = res.take_json().await?;

        assert_eq!(order.totals.total, "36.99");
        assert_eq!(order.status, "pending");
        assert_eq!(order.lines.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_takes_idempotency_key_from_header() -> TestResult {
        let order = make_order(OrderUuid::new())?;

        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_finalize()
            .once()
            .withf(|_, request| request.idempotency_key == "from-header")
            .return_once(move |_, _| Ok(order));

        let mut payload = body();

        if let Some(object) = payload.as_object_mut() {
            object.remove("idempotency_key");
        }

        let res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .add_header(IDEMPOTENCY_KEY_HEADER, "from-header", true)
            .json(&payload)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_invalid_address_returns_400_without_finalizing() -> TestResult {
        let mut payload = body();

        if let Some(address) = payload.get_mut("shipping_address").and_then(Value::as_object_mut) {
            address.insert("city".to_string(), json!("  "));
        }

        let mut res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&payload)
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert!(res.take_string().await?.contains("city is required"));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_price_mismatch_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_finalize()
            .once()
            .return_once(|_, _| {
                Err(FinalizeError::PriceMismatch {
                    expected: Decimal::new(3699, 2),
                    actual: Decimal::new(3799, 2),
                })
            });

        let res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&body())
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_declined_payment_returns_422() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_finalize()
            .once()
            .return_once(|_, _| Err(FinalizeError::PaymentDeclined("card declined".to_string())));

        let res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&body())
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_finalize()
            .once()
            .return_once(|_, _| Err(FinalizeError::EmptyCart));

        let res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&body())
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_timeout_returns_503() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_finalize()
            .once()
            .return_once(|_, _| Err(FinalizeError::Timeout));

        let res = TestClient::post("http://example.com/checkout")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&body())
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }
}
