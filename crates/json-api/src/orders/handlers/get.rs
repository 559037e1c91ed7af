//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use checkout_app::domain::{identity::Actor, orders::models::Order};

use crate::{
    errors::into_status_error, extensions::*, orders::models::OrderResponse, state::State,
};

/// Orders placed by a signed-in user are only visible to that user.
fn visible_to(order: &Order, actor: &Actor) -> bool {
    order.user_uuid.is_none_or(|owner| actor.user() == Some(owner))
}

/// Get Order Handler
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let order = state
        .app
        .orders
        .get_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    if !visible_to(&order, actor) {
        return Err(StatusError::not_found().brief("order not found"));
    }

    Ok(Json(OrderResponse::new(order, state.currency)))
}
