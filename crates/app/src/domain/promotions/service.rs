//! Promotions Service

use std::sync::Arc;

use async_trait::async_trait;
use checkout::{PromotionCode, Rejection};
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{Span, info};

use crate::{
    codes::generate_promotion_code,
    domain::promotions::{
        errors::PromotionsServiceError,
        models::{NewPromotion, Promotion, PromotionUpdate, PromotionUuid, PromotionValidation},
        store::PromotionStore,
    },
};

const GENERATE_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct DefaultPromotionsService {
    store: Arc<dyn PromotionStore>,
}

impl std::fmt::Debug for DefaultPromotionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultPromotionsService").finish_non_exhaustive()
    }
}

impl DefaultPromotionsService {
    #[must_use]
    pub fn new(store: Arc<dyn PromotionStore>) -> Self {
        Self { store }
    }

    async fn unused_code(&self) -> Result<PromotionCode, PromotionsServiceError> {
        for _ in 0..GENERATE_CODE_ATTEMPTS {
            let code = generate_promotion_code(&mut rand::thread_rng())?;

            if self.store.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(PromotionsServiceError::CodeSpaceExhausted)
    }
}

/// Validates a code against a subtotal without touching any counters.
pub(crate) fn evaluate(
    raw_code: &str,
    promotion: Option<Promotion>,
    subtotal: Decimal,
    now: Timestamp,
) -> PromotionValidation {
    let Some(promotion) = promotion else {
        return PromotionValidation::Rejected {
            code: raw_code.trim().to_ascii_uppercase(),
            reason: Rejection::NotFound,
        };
    };

    match promotion.terms.evaluate(subtotal, now) {
        Ok(discount) => PromotionValidation::Applied {
            promotion,
            discount,
        },
        Err(reason) => PromotionValidation::Rejected {
            code: promotion.code.to_string(),
            reason,
        },
    }
}

#[async_trait]
impl PromotionsService for DefaultPromotionsService {
    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, promotion),
        fields(promotion_uuid = tracing::field::Empty, code = tracing::field::Empty),
        err
    )]
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<Promotion, PromotionsServiceError> {
        let now = Timestamp::now();
        let terms = promotion.terms(now);

        terms.check()?;

        let code = match promotion.code {
            Some(code) => code,
            None => self.unused_code().await?,
        };

        let uuid = PromotionUuid::new();

        let span = Span::current();

        span.record("promotion_uuid", tracing::field::display(uuid));
        span.record("code", tracing::field::display(&code));

        let created = self
            .store
            .insert(Promotion {
                uuid,
                code,
                terms,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(promotion_uuid = %created.uuid, "created promotion");

        Ok(created)
    }

    #[tracing::instrument(
        name = "promotions.service.update_promotion",
        skip(self, update),
        fields(code = %code),
        err
    )]
    async fn update_promotion(
        &self,
        code: &PromotionCode,
        update: PromotionUpdate,
    ) -> Result<Promotion, PromotionsServiceError> {
        let current = self
            .store
            .find_by_code(code)
            .await?
            .ok_or(PromotionsServiceError::NotFound)?;

        let terms = update.apply_to(&current.terms);

        terms.check()?;

        // Usage may have grown since the read; the store re-checks the limit on write.
        let updated = self.store.update_terms(code, &terms).await?;

        info!(promotion_uuid = %updated.uuid, "updated promotion");

        Ok(updated)
    }

    async fn get_promotion(&self, code: &PromotionCode) -> Result<Promotion, PromotionsServiceError> {
        self.store
            .find_by_code(code)
            .await?
            .ok_or(PromotionsServiceError::NotFound)
    }

    async fn list_promotions(&self) -> Result<Vec<Promotion>, PromotionsServiceError> {
        self.store.list().await
    }

    #[tracing::instrument(name = "promotions.service.delete_promotion", skip(self), fields(code = %code), err)]
    async fn delete_promotion(&self, code: &PromotionCode) -> Result<(), PromotionsServiceError> {
        if !self.store.delete(code).await? {
            return Err(PromotionsServiceError::NotFound);
        }

        info!("deleted promotion");

        Ok(())
    }

    async fn generate_code(&self) -> Result<PromotionCode, PromotionsServiceError> {
        self.unused_code().await
    }

    async fn check_code(
        &self,
        code: &str,
        subtotal: Decimal,
        now: Timestamp,
    ) -> Result<PromotionValidation, PromotionsServiceError> {
        let promotion = match PromotionCode::parse(code) {
            Ok(code) => self.store.find_by_code(&code).await?,
            Err(_) => None,
        };

        Ok(evaluate(code, promotion, subtotal, now))
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Creates a promotion, generating a code when none is given.
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<Promotion, PromotionsServiceError>;

    /// Edits a promotion's terms.
    async fn update_promotion(
        &self,
        code: &PromotionCode,
        update: PromotionUpdate,
    ) -> Result<Promotion, PromotionsServiceError>;

    /// Retrieve a single promotion.
    async fn get_promotion(&self, code: &PromotionCode) -> Result<Promotion, PromotionsServiceError>;

    /// All promotions.
    async fn list_promotions(&self) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Deletes a promotion.
    async fn delete_promotion(&self, code: &PromotionCode) -> Result<(), PromotionsServiceError>;

    /// A random code not used by any promotion.
    async fn generate_code(&self) -> Result<PromotionCode, PromotionsServiceError>;

    /// Advisory validation of a raw code against a subtotal.
    async fn check_code(
        &self,
        code: &str,
        subtotal: Decimal,
        now: Timestamp,
    ) -> Result<PromotionValidation, PromotionsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use checkout::{PromotionKind, PromotionStatus, promotions::InvalidTerms};
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{domain::promotions::MockPromotionStore, memory::MemoryStore};

    use super::*;

    fn percent_off(code: &str, value: u32) -> Result<NewPromotion, PromotionsServiceError> {
        Ok(NewPromotion {
            code: Some(PromotionCode::parse(code)?),
            kind: PromotionKind::Percentage,
            value: Decimal::from(value),
            min_order_amount: None,
            max_discount: None,
            usage_limit: None,
            valid_from: None,
            valid_until: None,
            status: PromotionStatus::Active,
        })
    }

    fn service() -> DefaultPromotionsService {
        DefaultPromotionsService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_normalises_code() -> TestResult {
        let promotions = service();

        let created = promotions.create_promotion(percent_off("summer10", 10)?).await?;

        assert_eq!(created.code.as_str(), "SUMMER10");
        assert_eq!(created.terms.usage_count, 0);

        let fetched = promotions.get_promotion(&PromotionCode::parse("Summer10")?).await?;

        assert_eq!(fetched.uuid, created.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn create_duplicate_code_returns_already_exists() -> TestResult {
        let promotions = service();

        promotions.create_promotion(percent_off("DUP", 10)?).await?;

        let result = promotions.create_promotion(percent_off("dup", 20)?).await;

        assert!(
            matches!(result, Err(PromotionsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_percentage() -> TestResult {
        let result = service().create_promotion(percent_off("BIG", 150)?).await;

        assert!(
            matches!(
                result,
                Err(PromotionsServiceError::InvalidTerms(
                    InvalidTerms::PercentageOutOfRange
                ))
            ),
            "expected InvalidTerms, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_without_code_generates_one() -> TestResult {
        let mut new = percent_off("X", 5)?;
        new.code = None;

        let created = service().create_promotion(new).await?;

        assert_eq!(created.code.as_str().len(), crate::codes::PROMOTION_CODE_LENGTH);

        Ok(())
    }

    #[tokio::test]
    async fn check_code_applies_discount() -> TestResult {
        let promotions = service();

        promotions.create_promotion(percent_off("PERCENT10", 10)?).await?;

        let validation = promotions
            .check_code("percent10", Decimal::from(25), Timestamp::now())
            .await?;

        assert!(validation.is_applied());
        assert_eq!(validation.discount(), Decimal::from_str("2.5")?);

        Ok(())
    }

    #[tokio::test]
    async fn check_code_unknown_is_not_found() -> TestResult {
        let validation = service()
            .check_code("nope", Decimal::from(25), Timestamp::now())
            .await?;

        assert_eq!(
            validation,
            PromotionValidation::Rejected {
                code: "NOPE".to_string(),
                reason: Rejection::NotFound,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn check_code_below_minimum_reports_threshold() -> TestResult {
        let promotions = service();

        let mut new = percent_off("MIN50", 10)?;
        new.min_order_amount = Some(Decimal::from(50));

        promotions.create_promotion(new).await?;

        let validation = promotions
            .check_code("MIN50", Decimal::from(25), Timestamp::now())
            .await?;

        assert!(matches!(
            validation,
            PromotionValidation::Rejected {
                reason: Rejection::MinOrderNotMet { minimum },
                ..
            } if minimum == Decimal::from(50)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn check_code_expired_is_rejected() -> TestResult {
        let promotions = service();
        let now = Timestamp::now();

        let mut new = percent_off("OLD", 10)?;
        new.valid_from = Some(now.checked_sub(48.hours())?);
        new.valid_until = Some(now.checked_sub(1.hour())?);
        new.usage_limit = Some(100);

        promotions.create_promotion(new).await?;

        let validation = promotions.check_code("OLD", Decimal::from(100), now).await?;

        assert!(matches!(
            validation,
            PromotionValidation::Rejected {
                reason: Rejection::Expired,
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_usage_count_and_rejects_low_limit() -> TestResult {
        let store = MemoryStore::new();
        let promotions = DefaultPromotionsService::new(Arc::new(store.clone()));

        let created = promotions.create_promotion(percent_off("USED", 10)?).await?;

        store.set_usage_count(created.uuid, 3).await;

        let mut update = PromotionUpdate {
            kind: PromotionKind::Fixed,
            value: Decimal::from(5),
            min_order_amount: None,
            max_discount: None,
            usage_limit: Some(10),
            valid_from: created.terms.valid_from,
            valid_until: None,
            status: PromotionStatus::Active,
        };

        let updated = promotions.update_promotion(&created.code, update.clone()).await?;

        assert_eq!(updated.terms.kind, PromotionKind::Fixed);
        assert_eq!(updated.terms.usage_count, 3);

        update.usage_limit = Some(2);

        let result = promotions.update_promotion(&created.code, update).await;

        assert!(
            matches!(result, Err(PromotionsServiceError::InvalidTerms(_))),
            "expected InvalidTerms, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_of_concurrently_deleted_promotion_is_not_found() -> TestResult {
        let existing = service().create_promotion(percent_off("FLEETING", 10)?).await?;

        let mut store = MockPromotionStore::new();

        let found = existing.clone();
        store
            .expect_find_by_code()
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_update_terms()
            .times(1)
            .returning(|_, _| Err(PromotionsServiceError::NotFound));

        let update = PromotionUpdate {
            kind: PromotionKind::Percentage,
            value: Decimal::from(15),
            min_order_amount: None,
            max_discount: None,
            usage_limit: None,
            valid_from: existing.terms.valid_from,
            valid_until: None,
            status: PromotionStatus::Active,
        };

        let result = DefaultPromotionsService::new(Arc::new(store))
            .update_promotion(&existing.code, update)
            .await;

        assert!(
            matches!(result, Err(PromotionsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_promotion_is_not_found() -> TestResult {
        let result = service()
            .delete_promotion(&PromotionCode::parse("GONE")?)
            .await;

        assert!(
            matches!(result, Err(PromotionsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
