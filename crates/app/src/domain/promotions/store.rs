//! Promotion storage.

use async_trait::async_trait;
use checkout::{PromotionCode, PromotionTerms, promotions::InvalidTerms};
use mockall::automock;

use crate::domain::promotions::{errors::PromotionsServiceError, models::Promotion};

#[automock]
#[async_trait]
pub trait PromotionStore: Send + Sync {
    /// Look up a promotion by its normalised code.
    async fn find_by_code(
        &self,
        code: &PromotionCode,
    ) -> Result<Option<Promotion>, PromotionsServiceError>;

    /// All promotions, newest first.
    async fn list(&self) -> Result<Vec<Promotion>, PromotionsServiceError>;

    /// Insert a promotion; a taken code is [`PromotionsServiceError::AlreadyExists`].
    async fn insert(&self, promotion: Promotion) -> Result<Promotion, PromotionsServiceError>;

    /// Replace everything but the usage count.
    ///
    /// A missing promotion is [`PromotionsServiceError::NotFound`]; a usage limit below the
    /// current usage count is [`InvalidTerms::UsageLimitBelowCount`] and writes nothing.
    async fn update_terms(
        &self,
        code: &PromotionCode,
        terms: &PromotionTerms,
    ) -> Result<Promotion, PromotionsServiceError>;

    /// Delete a promotion; `false` when it did not exist.
    async fn delete(&self, code: &PromotionCode) -> Result<bool, PromotionsServiceError>;
}
