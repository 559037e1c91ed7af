//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::models::CartItemResponse, errors::into_status_error, extensions::*, state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub product_uuid: Uuid,

    /// Added to any quantity already in the cart
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Add Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    responses(
        (status_code = StatusCode::CREATED, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid quantity"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Product unavailable or not enough stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.items.add",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty, quantity = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(request.product_uuid));
    span.record("quantity", request.quantity);

    let line = state
        .app
        .carts
        .add_item(&owner, request.product_uuid.into(), request.quantity)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, "/cart", true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(line.into()))
}

#[cfg(test)]
mod tests {
    use checkout_app::domain::{
        carts::{CartsServiceError, models::CartLine},
        catalog::models::ProductUuid,
    };
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        identity::SESSION_TOKEN_HEADER,
        test_helpers::{Mocks, TEST_SESSION, guest_owner, shopper_service},
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        shopper_service(mocks, Router::with_path("cart/items").post(handler))
    }

    #[tokio::test]
    async fn test_add_item_returns_201_with_merged_quantity() -> TestResult {
        let owner = guest_owner()?;
        let product = ProductUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .withf(move |o, p, q| *o == owner && *p == product && *q == 2)
            .return_once(move |_, _, _| {
                Ok(CartLine {
                    product_uuid: product,
                    quantity: 3,
                    added_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post("http://example.com/cart/items")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&json!({ "product_uuid": Uuid::from(product), "quantity": 2 }))
            .send(&make_service(mocks))
            .await;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location.as_deref(), Some("/cart"));

        let body: CartItemResponse = res.take_json().await?;

        assert_eq!(body.quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_defaults_quantity_to_one() -> TestResult {
        let product = ProductUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .withf(|_, _, q| *q == 1)
            .return_once(move |_, _, _| {
                Ok(CartLine {
                    product_uuid: product,
                    quantity: 1,
                    added_at: Timestamp::UNIX_EPOCH,
                })
            });

        let res = TestClient::post("http://example.com/cart/items")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&json!({ "product_uuid": Uuid::from(product) }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_beyond_stock_returns_422() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::InsufficientStock { available: 2 }));

        let res = TestClient::post("http://example.com/cart/items")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&json!({ "product_uuid": Uuid::now_v7(), "quantity": 5 }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_zero_quantity_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::InvalidQuantity));

        let res = TestClient::post("http://example.com/cart/items")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&json!({ "product_uuid": Uuid::now_v7(), "quantity": 0 }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_unknown_product_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::ProductNotFound));

        let res = TestClient::post("http://example.com/cart/items")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .json(&json!({ "product_uuid": Uuid::now_v7() }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
