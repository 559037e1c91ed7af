//! Delete Promotion Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{errors::into_status_error, extensions::*, promotions::parse_code, state::State};

/// Delete Promotion Handler
///
/// Orders keep their snapshot of the code after the promotion is gone.
#[endpoint(
    tags("promotions"),
    summary = "Delete Promotion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Promotion deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Promotion not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let code = parse_code(&code.into_inner())?;

    state
        .app
        .promotions
        .delete_promotion(&code)
        .await
        .map_err(into_status_error)?;

    tracing::info!(code = %code, "deleted promotion");

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}

#[cfg(test)]
mod tests {
    use checkout_app::domain::promotions::PromotionsServiceError;
    use salvo::{http::header::AUTHORIZATION, test::TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, bearer, operator_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        operator_service(mocks, Router::with_path("promotions/{code}").delete(handler))
    }

    #[tokio::test]
    async fn test_delete_promotion_returns_204() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_delete_promotion()
            .once()
            .withf(|code| code.as_str() == "SAVE10")
            .return_once(|_| Ok(()));

        let res = TestClient::delete("http://example.com/promotions/SAVE10")
            .add_header(AUTHORIZATION, bearer(), true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_promotion_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_delete_promotion()
            .once()
            .return_once(|_| Err(PromotionsServiceError::NotFound));

        let res = TestClient::delete("http://example.com/promotions/NOPE")
            .add_header(AUTHORIZATION, bearer(), true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
