//! In-process cart storage.

use std::sync::Arc;

use async_trait::async_trait;
use checkout::PromotionCode;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        models::{Cart, CartLine, CartOwner, CartUuid},
        store::CartStore,
    },
    catalog::models::ProductUuid,
};

#[derive(Debug, Clone)]
struct StoredCart {
    uuid: CartUuid,
    lines: Vec<CartLine>,
    promotion_code: Option<PromotionCode>,
}

impl StoredCart {
    fn new() -> Self {
        Self {
            uuid: CartUuid::new(),
            lines: Vec::new(),
            promotion_code: None,
        }
    }
}

/// Carts held in process memory, keyed by owner.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    carts: Arc<Mutex<FxHashMap<String, StoredCart>>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn load(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        let carts = self.carts.lock().await;

        Ok(match carts.get(&owner.key()) {
            Some(stored) => Cart {
                uuid: Some(stored.uuid),
                owner: owner.clone(),
                lines: stored.lines.clone(),
                promotion_code: stored.promotion_code.clone(),
            },
            None => Cart::empty(owner.clone()),
        })
    }

    async fn add_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
        max_quantity: u32,
    ) -> Result<Option<u32>, CartsServiceError> {
        let mut carts = self.carts.lock().await;

        let existing = carts
            .get(&owner.key())
            .and_then(|cart| cart.lines.iter().find(|line| line.product_uuid == product))
            .map_or(0, |line| line.quantity);

        let Some(total) = existing.checked_add(quantity).filter(|total| *total <= max_quantity)
        else {
            return Ok(None);
        };

        let cart = carts.entry(owner.key()).or_insert_with(StoredCart::new);

        match cart.lines.iter_mut().find(|line| line.product_uuid == product) {
            Some(line) => line.quantity = total,
            None => cart.lines.push(CartLine {
                product_uuid: product,
                quantity: total,
                added_at: Timestamp::now(),
            }),
        }

        Ok(Some(total))
    }

    async fn set_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, CartsServiceError> {
        let mut carts = self.carts.lock().await;

        let line = carts
            .get_mut(&owner.key())
            .and_then(|cart| cart.lines.iter_mut().find(|line| line.product_uuid == product));

        Ok(line.map(|line| line.quantity = quantity).is_some())
    }

    async fn remove_line(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        let mut carts = self.carts.lock().await;

        if let Some(cart) = carts.get_mut(&owner.key()) {
            cart.lines.retain(|line| line.product_uuid != product);
        }

        Ok(())
    }

    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError> {
        self.carts.lock().await.remove(&owner.key());

        Ok(())
    }

    async fn set_promotion_code(
        &self,
        owner: &CartOwner,
        code: Option<PromotionCode>,
    ) -> Result<(), CartsServiceError> {
        let mut carts = self.carts.lock().await;

        match code {
            Some(code) => {
                carts.entry(owner.key()).or_insert_with(StoredCart::new).promotion_code = Some(code);
            }
            None => {
                if let Some(cart) = carts.get_mut(&owner.key()) {
                    cart.promotion_code = None;
                }
            }
        }

        Ok(())
    }
}
