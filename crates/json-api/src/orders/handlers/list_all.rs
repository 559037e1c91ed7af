//! List All Orders Handler

use std::sync::Arc;

use checkout::FulfillmentStatus;
use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    errors::into_status_error, extensions::*, orders::models::OrderResponse, state::State,
};

/// List All Orders Handler
///
/// Every order in the store, newest first. `status` narrows the list to one fulfilment status.
#[endpoint(
    tags("orders"),
    summary = "List All Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = status
        .into_inner()
        .filter(|status| !status.trim().is_empty())
        .map(|status| status.trim().parse::<FulfillmentStatus>())
        .transpose()
        .or_400("invalid status")?;

    let orders = state
        .app
        .orders
        .list_orders(status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        orders
            .into_iter()
            .map(|order| OrderResponse::new(order, state.currency))
            .collect(),
    ))
}
