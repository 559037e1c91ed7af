//! List Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    errors::into_status_error, extensions::*, orders::models::OrderResponse, state::State,
};

/// List Orders Handler
///
/// Orders of the signed-in user, newest first. Guests have no order history.
#[endpoint(
    tags("orders"),
    summary = "List My Orders",
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::FORBIDDEN, description = "Guests have no order history"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let Some(user) = depot.actor_or_401()?.user() else {
        return Err(StatusError::forbidden().brief("Sign in to see order history"));
    };

    let orders = state
        .app
        .orders
        .list_orders_for_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        orders
            .into_iter()
            .map(|order| OrderResponse::new(order, state.currency))
            .collect(),
    ))
}
