//! Update Promotion Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};

use crate::{
    errors::into_status_error,
    extensions::*,
    promotions::{
        models::{PromotionResponse, UpdatePromotionRequest},
        parse_code,
    },
    state::State,
};

/// Update Promotion Handler
#[endpoint(
    tags("promotions"),
    summary = "Update Promotion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promotion updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid terms"),
        (status_code = StatusCode::NOT_FOUND, description = "Promotion not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "promotions.update", skip(code, json, depot), err)]
pub(crate) async fn handler(
    code: PathParam<String>,
    json: JsonBody<UpdatePromotionRequest>,
    depot: &mut Depot,
) -> Result<Json<PromotionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let code = parse_code(&code.into_inner())?;

    let updated = state
        .app
        .promotions
        .update_promotion(&code, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
