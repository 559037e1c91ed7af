//! Apply Promotion Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::models::PromotionStatusResponse, errors::into_status_error, extensions::*,
    state::State,
};

/// Apply Promotion Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyPromotionRequest {
    /// Case-insensitive promotion code
    pub code: String,
}

/// Apply Promotion Handler
///
/// Validates a code against the current cart. The result is advisory: a code that applies is
/// remembered on the cart and checked again at checkout, a code that does not is reported with
/// its reason and not stored.
#[endpoint(
    tags("cart"),
    summary = "Apply Promotion Code",
    responses(
        (status_code = StatusCode::OK, description = "Validation result"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "cart.promotion.apply", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<ApplyPromotionRequest>,
    depot: &mut Depot,
) -> Result<Json<PromotionStatusResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    let validation = state
        .app
        .checkout
        .apply_promotion(&owner, &json.into_inner().code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(validation.into()))
}
