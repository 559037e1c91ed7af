//! Get Promotion Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    errors::into_status_error,
    extensions::*,
    promotions::{models::PromotionResponse, parse_code},
    state::State,
};

/// Get Promotion Handler
#[endpoint(
    tags("promotions"),
    summary = "Get Promotion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promotion"),
        (status_code = StatusCode::NOT_FOUND, description = "Promotion not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<PromotionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let code = parse_code(&code.into_inner())?;

    let promotion = state
        .app
        .promotions
        .get_promotion(&code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(promotion.into()))
}

#[cfg(test)]
mod tests {
    use checkout_app::domain::promotions::PromotionsServiceError;
    use salvo::{
        http::header::AUTHORIZATION,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, bearer, make_promotion, operator_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        operator_service(mocks, Router::with_path("promotions/{code}").get(handler))
    }

    #[tokio::test]
    async fn test_get_promotion_normalises_path_code() -> TestResult {
        let promotion = make_promotion("SAVE10")?;

        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_get_promotion()
            .once()
            .withf(|code| code.as_str() == "SAVE10")
            .return_once(move |_| Ok(promotion));

        let mut res = TestClient::get("http://example.com/promotions/save10")
            .add_header(AUTHORIZATION, bearer(), true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: PromotionResponse = res.take_json().await?;

        assert_eq!(body.code, "SAVE10");
        assert_eq!(body.value, "10");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_promotion_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_get_promotion()
            .once()
            .return_once(|_| Err(PromotionsServiceError::NotFound));

        let res = TestClient::get("http://example.com/promotions/NOPE")
            .add_header(AUTHORIZATION, bearer(), true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
