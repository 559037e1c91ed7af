//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::models::CartResponse, errors::into_status_error, extensions::*, state::State,
};

/// Get Cart Handler
///
/// Returns the shopper's cart priced at current catalog prices.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart summary"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No shopper identity"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let summary = state
        .app
        .checkout
        .summary(&owner)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::new(summary, state.currency)))
}
