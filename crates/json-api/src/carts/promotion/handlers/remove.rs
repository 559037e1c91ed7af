//! Remove Promotion Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::into_status_error, extensions::*, state::State};

/// Remove Promotion Handler
#[endpoint(
    tags("cart"),
    summary = "Remove Promotion Code",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Promotion removed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot, res: &mut Response) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    state
        .app
        .checkout
        .remove_promotion(&owner)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}
