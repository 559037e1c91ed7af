//! Request ids: echoed from `x-request-id` when usable, otherwise a fresh UUIDv7.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id kept; longer ids are replaced.
const MAX_REQUEST_ID_LENGTH: usize = 128;

fn usable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LENGTH
        && id.chars().all(|c| c.is_ascii_graphic())
}

pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    match header_value {
        Some(id) if usable(id.trim()) => id.trim().to_string(),
        _ => Uuid::now_v7().to_string(),
    }
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(source) => warn!(request_id, "request id not sent back: {source}"),
    }
}

/// Handlers that write a body without a status answered 200.
pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callers_id_is_kept_when_usable() {
        assert_eq!(resolve_request_id(Some(" checkout-7 ".to_string())), "checkout-7");
    }

    #[test]
    fn unusable_ids_are_replaced() {
        let too_long = "x".repeat(MAX_REQUEST_ID_LENGTH + 1);

        for bad in ["", "   ", "has space", too_long.as_str()] {
            let id = resolve_request_id(Some(bad.to_string()));

            assert!(Uuid::parse_str(&id).is_ok(), "{bad:?} was kept as {id:?}");
        }
    }
}
