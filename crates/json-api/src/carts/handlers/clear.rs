//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::into_status_error, extensions::*, state::State};

/// Clear Cart Handler
///
/// Removes every line and the applied promotion code.
#[endpoint(
    tags("cart"),
    summary = "Clear Cart",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart cleared"),
        (status_code = StatusCode::UNAUTHORIZED, description = "No shopper identity"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot, res: &mut Response) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = depot.owner_or_401()?;

    state
        .app
        .carts
        .clear(&owner)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use crate::{
        identity::SESSION_TOKEN_HEADER,
        test_helpers::{Mocks, TEST_SESSION, guest_owner, shopper_service},
    };

    use super::*;

    #[tokio::test]
    async fn test_clear_cart_returns_204() -> TestResult {
        let owner = guest_owner()?;
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_clear()
            .once()
            .withf(move |o| *o == owner)
            .return_once(|_| Ok(()));

        let res = TestClient::delete("http://example.com/cart")
            .add_header(SESSION_TOKEN_HEADER, TEST_SESSION, true)
            .send(&shopper_service(
                mocks,
                Router::with_path("cart").delete(handler),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }
}
