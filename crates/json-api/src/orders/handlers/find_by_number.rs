//! Find Order By Number Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    errors::into_status_error, extensions::*, orders::models::OrderResponse, state::State,
};

/// Find Order By Number Handler
#[endpoint(
    tags("orders"),
    summary = "Find Order By Number",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    number: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let number = number.into_inner();

    let order = state
        .app
        .orders
        .find_by_number(number.trim())
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderResponse::new(order, state.currency)))
}
