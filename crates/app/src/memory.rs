//! In-process catalog, promotions and order ledger.
//!
//! Everything lives behind one lock, so a commit validates and applies all of its writes
//! without interleaving with another commit.

use std::sync::Arc;

use async_trait::async_trait;
use checkout::{
    FulfillmentStatus, PaymentStatus, PromotionCode, PromotionTerms, Rejection,
    promotions::{InvalidPromotionCode, InvalidTerms},
};
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    codes::generate_promotion_code,
    domain::{
        catalog::{
            CatalogError, CatalogGateway,
            models::{CatalogProduct, ProductUuid},
        },
        identity::UserUuid,
        orders::{
            LedgerError, OrderLedger,
            models::{Order, OrderUuid},
        },
        promotions::{
            PromotionStore, PromotionsServiceError,
            models::{NewPromotion, Promotion, PromotionUuid},
        },
    },
};

#[derive(Debug, Default)]
struct State {
    products: FxHashMap<ProductUuid, CatalogProduct>,
    promotions: FxHashMap<PromotionUuid, Promotion>,
    orders: FxHashMap<OrderUuid, Order>,
}

impl State {
    fn promotion_by_code(&self, code: &PromotionCode) -> Option<&Promotion> {
        self.promotions.values().find(|promotion| &promotion.code == code)
    }
}

/// Seed data for [`MemoryStore::seed_from_json`].
#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    products: Vec<CatalogProduct>,
    #[serde(default)]
    promotions: Vec<NewPromotion>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed document")]
    Json(#[from] serde_json::Error),

    #[error("invalid promotion code in seed")]
    Code(#[from] InvalidPromotionCode),

    #[error("invalid promotion terms in seed")]
    Terms(#[from] InvalidTerms),

    #[error("duplicate promotion code {0} in seed")]
    DuplicateCode(PromotionCode),
}

/// Catalog, promotions and orders held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON document with `products` and `promotions` arrays.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the document or any promotion in it is invalid.
    pub fn seed_from_json(json: &str) -> Result<Self, SeedError> {
        let seed: Seed = serde_json::from_str(json)?;
        let now = Timestamp::now();

        let mut state = State::default();

        for product in seed.products {
            state.products.insert(product.uuid, product);
        }

        for new in seed.promotions {
            let terms = new.terms(now);

            terms.check()?;

            let code = match new.code {
                Some(code) => code,
                None => generate_promotion_code(&mut rand::thread_rng())?,
            };

            if state.promotion_by_code(&code).is_some() {
                return Err(SeedError::DuplicateCode(code));
            }

            let uuid = PromotionUuid::new();

            state.promotions.insert(
                uuid,
                Promotion {
                    uuid,
                    code,
                    terms,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        debug!(
            products = state.products.len(),
            promotions = state.promotions.len(),
            "seeded memory store"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Adds or replaces a product.
    pub async fn insert_product(&self, product: CatalogProduct) {
        self.state.lock().await.products.insert(product.uuid, product);
    }

    /// Current stock of a product, if it exists.
    pub async fn stock(&self, product: ProductUuid) -> Option<u32> {
        self.state
            .lock()
            .await
            .products
            .get(&product)
            .map(|product| product.stock_quantity)
    }

    /// Number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    #[cfg(test)]
    pub(crate) async fn set_usage_count(&self, promotion: PromotionUuid, count: u64) {
        if let Some(promotion) = self.state.lock().await.promotions.get_mut(&promotion) {
            promotion.terms.usage_count = count;
        }
    }
}

#[async_trait]
impl CatalogGateway for MemoryStore {
    async fn get_product(&self, product: ProductUuid) -> Result<CatalogProduct, CatalogError> {
        self.state
            .lock()
            .await
            .products
            .get(&product)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }
}

#[async_trait]
impl PromotionStore for MemoryStore {
    async fn find_by_code(
        &self,
        code: &PromotionCode,
    ) -> Result<Option<Promotion>, PromotionsServiceError> {
        Ok(self.state.lock().await.promotion_by_code(code).cloned())
    }

    async fn list(&self) -> Result<Vec<Promotion>, PromotionsServiceError> {
        let mut promotions: Vec<_> = self.state.lock().await.promotions.values().cloned().collect();

        promotions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(promotions)
    }

    async fn insert(&self, promotion: Promotion) -> Result<Promotion, PromotionsServiceError> {
        let mut state = self.state.lock().await;

        if state.promotion_by_code(&promotion.code).is_some() {
            return Err(PromotionsServiceError::AlreadyExists);
        }

        state.promotions.insert(promotion.uuid, promotion.clone());

        Ok(promotion)
    }

    async fn update_terms(
        &self,
        code: &PromotionCode,
        terms: &PromotionTerms,
    ) -> Result<Promotion, PromotionsServiceError> {
        let mut state = self.state.lock().await;

        let promotion = state
            .promotions
            .values_mut()
            .find(|promotion| &promotion.code == code)
            .ok_or(PromotionsServiceError::NotFound)?;

        let usage_count = promotion.terms.usage_count;

        if terms.usage_limit.is_some_and(|limit| usage_count > limit) {
            return Err(PromotionsServiceError::InvalidTerms(
                InvalidTerms::UsageLimitBelowCount,
            ));
        }

        promotion.terms = PromotionTerms {
            usage_count,
            ..terms.clone()
        };
        promotion.updated_at = Timestamp::now();

        Ok(promotion.clone())
    }

    async fn delete(&self, code: &PromotionCode) -> Result<bool, PromotionsServiceError> {
        let mut state = self.state.lock().await;

        let uuid = state.promotion_by_code(code).map(|promotion| promotion.uuid);

        Ok(uuid.is_some_and(|uuid| state.promotions.remove(&uuid).is_some()))
    }
}

#[async_trait]
impl OrderLedger for MemoryStore {
    async fn commit(&self, order: &Order) -> Result<Order, LedgerError> {
        let now = Timestamp::now();
        let mut state = self.state.lock().await;

        if state
            .orders
            .values()
            .any(|existing| {
                existing.owner_key == order.owner_key
                    && existing.idempotency_key == order.idempotency_key
            })
        {
            return Err(LedgerError::DuplicateIdempotencyKey);
        }

        if state
            .orders
            .values()
            .any(|existing| existing.order_number == order.order_number)
        {
            return Err(LedgerError::DuplicateOrderNumber);
        }

        // The same product may appear on several lines; check against the combined demand.
        let mut demand: FxHashMap<ProductUuid, u32> = FxHashMap::default();

        for line in &order.lines {
            let entry = demand.entry(line.product_uuid).or_default();
            *entry = entry.saturating_add(line.quantity);
        }

        for (product, quantity) in &demand {
            match state.products.get(product) {
                Some(found) if found.is_purchasable() => {
                    if found.stock_quantity < *quantity {
                        return Err(LedgerError::InsufficientStock { product: *product });
                    }
                }
                _ => return Err(LedgerError::ProductUnavailable { product: *product }),
            }
        }

        if let Some(uuid) = order.promotion_uuid {
            let promotion = state
                .promotions
                .get(&uuid)
                .ok_or(LedgerError::PromotionUnavailable)?;

            match promotion.terms.check_redeemable(now) {
                Ok(()) => {}
                Err(Rejection::UsageLimitReached) => return Err(LedgerError::UsageLimitReached),
                Err(_) => return Err(LedgerError::PromotionUnavailable),
            }
        }

        // Nothing below can fail.
        for (product, quantity) in demand {
            if let Some(found) = state.products.get_mut(&product) {
                found.stock_quantity -= quantity;
            }
        }

        if let Some(promotion) = order
            .promotion_uuid
            .and_then(|uuid| state.promotions.get_mut(&uuid))
        {
            promotion.terms.usage_count += 1;
            promotion.updated_at = now;
        }

        state.orders.insert(order.uuid, order.clone());

        Ok(order.clone())
    }

    async fn find_by_idempotency_key(
        &self,
        owner_key: &str,
        key: &str,
    ) -> Result<Option<Order>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .values()
            .find(|order| order.owner_key == owner_key && order.idempotency_key == key)
            .cloned())
    }

    async fn get(&self, order: OrderUuid) -> Result<Option<Order>, LedgerError> {
        Ok(self.state.lock().await.orders.get(&order).cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Order>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .values()
            .find(|order| order.order_number == number)
            .cloned())
    }

    async fn list_for_user(&self, user: UserUuid) -> Result<Vec<Order>, LedgerError> {
        let mut orders: Vec<_> = self
            .state
            .lock()
            .await
            .orders
            .values()
            .filter(|order| order.user_uuid == Some(user))
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(orders)
    }

    async fn list_orders(
        &self,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<Order>, LedgerError> {
        let mut orders: Vec<_> = self
            .state
            .lock()
            .await
            .orders
            .values()
            .filter(|order| status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.uuid.cmp(&a.uuid)));

        Ok(orders)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    ) -> Result<Option<Order>, LedgerError> {
        let mut state = self.state.lock().await;

        Ok(match state.orders.get_mut(&order) {
            Some(found) if found.status == from => {
                found.status = to;
                found.updated_at = Timestamp::now();

                Some(found.clone())
            }
            _ => None,
        })
    }

    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<Option<Order>, LedgerError> {
        let mut state = self.state.lock().await;

        Ok(state.orders.get_mut(&order).map(|found| {
            found.payment_status = status;
            found.updated_at = Timestamp::now();

            found.clone()
        }))
    }
}
