//! Update Payment Status Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    errors::into_status_error,
    extensions::*,
    orders::models::{OrderResponse, UpdatePaymentStatusRequest},
    state::State,
};

/// Update Payment Status Handler
#[endpoint(
    tags("orders"),
    summary = "Update Payment Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment status updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdatePaymentStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let updated = state
        .app
        .orders
        .update_payment_status(order.into_inner().into(), json.into_inner().payment_status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderResponse::new(updated, state.currency)))
}
