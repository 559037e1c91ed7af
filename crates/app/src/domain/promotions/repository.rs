//! Promotions Repository

use async_trait::async_trait;
use checkout::{PromotionCode, PromotionTerms, promotions::InvalidTerms};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{Db, try_get_opt_u64, try_get_parsed, try_get_u64},
    domain::promotions::{
        errors::PromotionsServiceError,
        models::{Promotion, PromotionUuid},
        store::PromotionStore,
    },
};

const GET_PROMOTION_BY_CODE_SQL: &str = include_str!("sql/get_promotion_by_code.sql");
const LIST_PROMOTIONS_SQL: &str = include_str!("sql/list_promotions.sql");
const CREATE_PROMOTION_SQL: &str = include_str!("sql/create_promotion.sql");
const UPDATE_PROMOTION_TERMS_SQL: &str = include_str!("sql/update_promotion_terms.sql");
const DELETE_PROMOTION_SQL: &str = include_str!("sql/delete_promotion.sql");
const PROMOTION_EXISTS_SQL: &str = include_str!("sql/promotion_exists.sql");

#[derive(Debug, Clone)]
pub struct PgPromotionStore {
    db: Db,
}

impl PgPromotionStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

pub(crate) fn count_param(value: u64) -> Result<i64, PromotionsServiceError> {
    i64::try_from(value).map_err(|_overflow| PromotionsServiceError::InvalidData)
}

#[async_trait]
impl PromotionStore for PgPromotionStore {
    async fn find_by_code(
        &self,
        code: &PromotionCode,
    ) -> Result<Option<Promotion>, PromotionsServiceError> {
        let promotion = query_as::<Postgres, Promotion>(GET_PROMOTION_BY_CODE_SQL)
            .bind(code.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(promotion)
    }

    async fn list(&self) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let promotions = query_as::<Postgres, Promotion>(LIST_PROMOTIONS_SQL)
            .fetch_all(self.db.pool())
            .await?;

        Ok(promotions)
    }

    #[tracing::instrument(
        name = "promotions.store.insert",
        skip(self, promotion),
        fields(promotion_uuid = %promotion.uuid, code = %promotion.code),
        err
    )]
    async fn insert(&self, promotion: Promotion) -> Result<Promotion, PromotionsServiceError> {
        let terms = &promotion.terms;

        let created = query_as::<Postgres, Promotion>(CREATE_PROMOTION_SQL)
            .bind(promotion.uuid.into_uuid())
            .bind(promotion.code.as_str())
            .bind(terms.kind.as_str())
            .bind(terms.value)
            .bind(terms.min_order_amount)
            .bind(terms.max_discount)
            .bind(terms.usage_limit.map(count_param).transpose()?)
            .bind(count_param(terms.usage_count)?)
            .bind(SqlxTimestamp::from(terms.valid_from))
            .bind(terms.valid_until.map(SqlxTimestamp::from))
            .bind(terms.status.as_str())
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    #[tracing::instrument(name = "promotions.store.update_terms", skip(self, terms), fields(code = %code), err)]
    async fn update_terms(
        &self,
        code: &PromotionCode,
        terms: &PromotionTerms,
    ) -> Result<Promotion, PromotionsServiceError> {
        let updated = query_as::<Postgres, Promotion>(UPDATE_PROMOTION_TERMS_SQL)
            .bind(code.as_str())
            .bind(terms.kind.as_str())
            .bind(terms.value)
            .bind(terms.min_order_amount)
            .bind(terms.max_discount)
            .bind(terms.usage_limit.map(count_param).transpose()?)
            .bind(SqlxTimestamp::from(terms.valid_from))
            .bind(terms.valid_until.map(SqlxTimestamp::from))
            .bind(terms.status.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        if let Some(updated) = updated {
            return Ok(updated);
        }

        let exists: bool = query_scalar(PROMOTION_EXISTS_SQL)
            .bind(code.as_str())
            .fetch_one(self.db.pool())
            .await?;

        if exists {
            Err(PromotionsServiceError::InvalidTerms(
                InvalidTerms::UsageLimitBelowCount,
            ))
        } else {
            Err(PromotionsServiceError::NotFound)
        }
    }

    #[tracing::instrument(name = "promotions.store.delete", skip(self), fields(code = %code), err)]
    async fn delete(&self, code: &PromotionCode) -> Result<bool, PromotionsServiceError> {
        let rows_affected = query(DELETE_PROMOTION_SQL)
            .bind(code.as_str())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

impl<'r> FromRow<'r, PgRow> for Promotion {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PromotionUuid::from_uuid(row.try_get("uuid")?),
            code: try_get_parsed(row, "code")?,
            terms: PromotionTerms {
                kind: try_get_parsed(row, "kind")?,
                value: row.try_get("value")?,
                min_order_amount: row.try_get("min_order_amount")?,
                max_discount: row.try_get("max_discount")?,
                usage_limit: try_get_opt_u64(row, "usage_limit")?,
                usage_count: try_get_u64(row, "usage_count")?,
                valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
                valid_until: row
                    .try_get::<Option<SqlxTimestamp>, _>("valid_until")?
                    .map(SqlxTimestamp::to_jiff),
                status: try_get_parsed(row, "status")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[cfg(test)]
mod tests {
    use checkout::{PromotionKind, PromotionStatus};
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn promotion(code: &str) -> TestResult<Promotion> {
        let now = Timestamp::now();

        Ok(Promotion {
            uuid: PromotionUuid::new(),
            code: PromotionCode::parse(code)?,
            terms: PromotionTerms {
                kind: PromotionKind::Percentage,
                value: Decimal::from(10),
                min_order_amount: None,
                max_discount: None,
                usage_limit: None,
                usage_count: 0,
                valid_from: now,
                valid_until: None,
                status: PromotionStatus::Active,
            },
            created_at: now,
            updated_at: now,
        })
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn update_terms_tells_missing_from_limit_below_count() -> TestResult {
        let ctx = TestContext::new().await;
        let created = ctx.promotions.insert(promotion("LIMITED")?).await?;

        query("UPDATE promotions SET usage_count = 3 WHERE uuid = $1")
            .bind(created.uuid.into_uuid())
            .execute(ctx.db.pool())
            .await?;

        let mut terms = created.terms.clone();
        terms.usage_limit = Some(2);

        let below = ctx.promotions.update_terms(&created.code, &terms).await;

        assert!(
            matches!(
                below,
                Err(PromotionsServiceError::InvalidTerms(
                    InvalidTerms::UsageLimitBelowCount
                ))
            ),
            "expected UsageLimitBelowCount, got {below:?}"
        );

        let missing = ctx
            .promotions
            .update_terms(&PromotionCode::parse("MISSING")?, &terms)
            .await;

        assert!(
            matches!(missing, Err(PromotionsServiceError::NotFound)),
            "expected NotFound, got {missing:?}"
        );

        terms.usage_limit = Some(5);

        let updated = ctx.promotions.update_terms(&created.code, &terms).await?;

        assert_eq!(updated.terms.usage_limit, Some(5));
        assert_eq!(updated.terms.usage_count, 3);

        Ok(())
    }
}
