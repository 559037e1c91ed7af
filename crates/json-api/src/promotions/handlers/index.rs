//! List Promotions Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    errors::into_status_error, extensions::*, promotions::models::PromotionResponse,
    state::State,
};

/// List Promotions Handler
#[endpoint(
    tags("promotions"),
    summary = "List Promotions",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promotions"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<PromotionResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let promotions = state
        .app
        .promotions
        .list_promotions()
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        promotions
            .into_iter()
            .map(PromotionResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::header::AUTHORIZATION,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, bearer, make_promotion, operator_service};

    use super::*;

    #[tokio::test]
    async fn test_list_promotions() -> TestResult {
        let promotions = vec![make_promotion("SAVE10")?, make_promotion("WELCOME")?];

        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_list_promotions()
            .once()
            .return_once(move || Ok(promotions));

        let mut res = TestClient::get("http://example.com/promotions")
            .add_header(AUTHORIZATION, bearer(), true)
            .send(&operator_service(
                mocks,
                Router::with_path("promotions").get(handler),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Vec<PromotionResponse> = res.take_json().await?;
        let codes: Vec<&str> = body.iter().map(|p| p.code.as_str()).collect();

        assert_eq!(codes, ["SAVE10", "WELCOME"]);

        Ok(())
    }
}
