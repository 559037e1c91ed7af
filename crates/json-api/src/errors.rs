//! Errors

use std::{error::Error, fmt::Display};

use salvo::http::StatusError;
use tracing::{error, warn};

use checkout_app::errors::{Classify, ErrorClass};

/// Maps a classified service error onto an HTTP error.
pub(crate) fn into_status_error<E>(error: E) -> StatusError
where
    E: Classify + Display + Error,
{
    let class = error.class();
    let message = error.to_string();

    match class {
        ErrorClass::Validation => StatusError::bad_request().brief(message),
        ErrorClass::NotFound => StatusError::not_found().brief(message),
        ErrorClass::Policy => StatusError::unprocessable_entity().brief(message),
        ErrorClass::Conflict => StatusError::conflict().brief(message),
        ErrorClass::Transient => {
            warn!(error = %message, source = ?error.source(), "transient failure");

            StatusError::service_unavailable().brief(message)
        }
        ErrorClass::Fatal => {
            error!(error = %message, source = ?error.source(), "request failed");

            StatusError::internal_server_error()
        }
    }
}
