//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use checkout::PromotionCode;
use mockall::automock;
use tracing::info;

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        models::{Cart, CartLine, CartOwner},
        store::CartStore,
    },
    catalog::{CatalogGateway, models::ProductUuid},
};

/// Carts backed by one store for signed-in users and another for guests.
#[derive(Clone)]
pub struct DefaultCartsService {
    durable: Arc<dyn CartStore>,
    guest: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogGateway>,
}

impl std::fmt::Debug for DefaultCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCartsService").finish_non_exhaustive()
    }
}

impl DefaultCartsService {
    #[must_use]
    pub fn new(
        durable: Arc<dyn CartStore>,
        guest: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogGateway>,
    ) -> Self {
        Self {
            durable,
            guest,
            catalog,
        }
    }

    fn store_for(&self, owner: &CartOwner) -> &dyn CartStore {
        if owner.is_guest() {
            self.guest.as_ref()
        } else {
            self.durable.as_ref()
        }
    }

    /// Stock available for a purchasable product.
    async fn available_stock(&self, product: ProductUuid) -> Result<u32, CartsServiceError> {
        let product = self.catalog.get_product(product).await?;

        if !product.is_purchasable() {
            return Err(CartsServiceError::ProductUnavailable);
        }

        Ok(product.stock_quantity)
    }

    async fn line(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<CartLine, CartsServiceError> {
        self.store_for(owner)
            .load(owner)
            .await?
            .line(product)
            .cloned()
            .ok_or(CartsServiceError::LineNotFound)
    }
}

#[async_trait]
impl CartsService for DefaultCartsService {
    async fn get_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        self.store_for(owner).load(owner).await
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn add_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, CartsServiceError> {
        if quantity < 1 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let available = self.available_stock(product).await?;

        if quantity > available {
            return Err(CartsServiceError::InsufficientStock { available });
        }

        let added = self
            .store_for(owner)
            .add_quantity(owner, product, quantity, available)
            .await?;

        if added.is_none() {
            return Err(CartsServiceError::InsufficientStock { available });
        }

        info!(quantity, "added item to cart");

        self.line(owner, product).await
    }

    #[tracing::instrument(
        name = "carts.service.update_quantity",
        skip(self),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn update_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, CartsServiceError> {
        if quantity < 1 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let available = self.available_stock(product).await?;

        if quantity > available {
            return Err(CartsServiceError::InsufficientStock { available });
        }

        if !self
            .store_for(owner)
            .set_quantity(owner, product, quantity)
            .await?
        {
            return Err(CartsServiceError::LineNotFound);
        }

        self.line(owner, product).await
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        self.store_for(owner).remove_line(owner, product).await
    }

    #[tracing::instrument(name = "carts.service.clear", skip(self), fields(owner = %owner), err)]
    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError> {
        self.store_for(owner).clear(owner).await
    }

    async fn set_promotion_code(
        &self,
        owner: &CartOwner,
        code: Option<PromotionCode>,
    ) -> Result<(), CartsServiceError> {
        self.store_for(owner).set_promotion_code(owner, code).await
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Resolve the owner's cart; an absent cart is empty.
    async fn get_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError>;

    /// Add a product, merging with an existing line for the same product.
    async fn add_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, CartsServiceError>;

    /// Replace the quantity of an existing line.
    async fn update_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, CartsServiceError>;

    /// Remove a line. Removing a missing line is not an error.
    async fn remove_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError>;

    /// Empty and discard the cart.
    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError>;

    /// Store or clear the applied promotion code.
    async fn set_promotion_code(
        &self,
        owner: &CartOwner,
        code: Option<PromotionCode>,
    ) -> Result<(), CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::{
        carts::{MemoryCartStore, MockCartStore},
        catalog::{
            CatalogError, MockCatalogGateway,
            models::{CatalogProduct, ProductStatus},
        },
        identity::{SessionToken, UserUuid},
    };

    use super::*;

    fn product(uuid: ProductUuid, stock: u32, status: ProductStatus) -> CatalogProduct {
        CatalogProduct {
            uuid,
            name: "Kikoy Towel".to_string(),
            sku: Some("KT-01".to_string()),
            price: Decimal::from(10),
            stock_quantity: stock,
            status,
        }
    }

    fn catalog_with(product: CatalogProduct) -> MockCatalogGateway {
        catalog_with_all(vec![product])
    }

    fn catalog_with_all(products: Vec<CatalogProduct>) -> MockCatalogGateway {
        let mut catalog = MockCatalogGateway::new();

        for product in products {
            catalog
                .expect_get_product()
                .with(eq(product.uuid))
                .returning(move |_| Ok(product.clone()));
        }

        catalog
    }

    fn service(catalog: MockCatalogGateway) -> DefaultCartsService {
        let memory = Arc::new(MemoryCartStore::new());

        DefaultCartsService::new(memory.clone(), memory, Arc::new(catalog))
    }

    fn guest() -> Result<CartOwner, crate::domain::identity::InvalidSessionToken> {
        Ok(CartOwner::Guest(SessionToken::parse("session-1")?))
    }

    #[tokio::test]
    async fn add_item_merges_quantity() -> TestResult {
        let uuid = ProductUuid::new();
        let carts = service(catalog_with(product(uuid, 10, ProductStatus::Active)));
        let owner = guest()?;

        carts.add_item(&owner, uuid, 2).await?;
        let line = carts.add_item(&owner, uuid, 3).await?;

        assert_eq!(line.quantity, 5);
        assert_eq!(carts.get_cart(&owner).await?.lines.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_zero_quantity() -> TestResult {
        let carts = service(MockCatalogGateway::new());

        let result = carts.add_item(&guest()?, ProductUuid::new(), 0).await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_beyond_stock_leaves_cart_unchanged() -> TestResult {
        let uuid = ProductUuid::new();
        let carts = service(catalog_with(product(uuid, 5, ProductStatus::Active)));
        let owner = guest()?;

        carts.add_item(&owner, uuid, 4).await?;

        let result = carts.add_item(&owner, uuid, 2).await;

        assert!(
            matches!(result, Err(CartsServiceError::InsufficientStock { available: 5 })),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(
            carts.get_cart(&owner).await?.line(uuid).map(|l| l.quantity),
            Some(4)
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_inactive_product() -> TestResult {
        let uuid = ProductUuid::new();
        let carts = service(catalog_with(product(uuid, 5, ProductStatus::Draft)));

        let result = carts.add_item(&guest()?, uuid, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductUnavailable)),
            "expected ProductUnavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unknown_product_is_not_found() -> TestResult {
        let mut catalog = MockCatalogGateway::new();

        catalog
            .expect_get_product()
            .returning(|_| Err(CatalogError::NotFound));

        let result = service(catalog).add_item(&guest()?, ProductUuid::new(), 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_quantity_missing_line_is_not_found() -> TestResult {
        let uuid = ProductUuid::new();
        let carts = service(catalog_with(product(uuid, 5, ProductStatus::Active)));

        let result = carts.update_quantity(&guest()?, uuid, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::LineNotFound)),
            "expected LineNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_quantity_replaces_and_respects_stock() -> TestResult {
        let uuid = ProductUuid::new();
        let carts = service(catalog_with(product(uuid, 5, ProductStatus::Active)));
        let owner = guest()?;

        carts.add_item(&owner, uuid, 4).await?;

        assert_eq!(carts.update_quantity(&owner, uuid, 1).await?.quantity, 1);
        assert!(matches!(
            carts.update_quantity(&owner, uuid, 6).await,
            Err(CartsServiceError::InsufficientStock { .. })
        ));
        assert!(matches!(
            carts.update_quantity(&owner, uuid, 0).await,
            Err(CartsServiceError::InvalidQuantity)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn remove_and_clear_are_unconditional() -> TestResult {
        let uuid = ProductUuid::new();
        let carts = service(catalog_with(product(uuid, 5, ProductStatus::Active)));
        let owner = guest()?;

        carts.remove_item(&owner, uuid).await?;
        carts.clear(&owner).await?;

        carts.add_item(&owner, uuid, 1).await?;
        carts.remove_item(&owner, uuid).await?;

        assert!(carts.get_cart(&owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn signed_in_owners_use_the_durable_store() -> TestResult {
        let user = CartOwner::User(UserUuid::new());

        let mut durable = MockCartStore::new();

        durable
            .expect_load()
            .times(1)
            .returning(|owner| Ok(Cart::empty(owner.clone())));

        let carts = DefaultCartsService::new(
            Arc::new(durable),
            Arc::new(MockCartStore::new()),
            Arc::new(MockCatalogGateway::new()),
        );

        assert!(carts.get_cart(&user).await?.is_empty());

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_line_changes_are_both_kept() -> TestResult {
        let towel = ProductUuid::new();
        let mug = ProductUuid::new();
        let lamp = ProductUuid::new();

        let carts = service(catalog_with_all(vec![
            product(towel, 10, ProductStatus::Active),
            product(mug, 10, ProductStatus::Active),
            product(lamp, 10, ProductStatus::Active),
        ]));
        let owner = guest()?;

        carts.add_item(&owner, towel, 1).await?;

        let (updated, added) = tokio::join!(
            carts.update_quantity(&owner, towel, 4),
            carts.add_item(&owner, mug, 2),
        );

        assert_eq!(updated?.quantity, 4);
        assert_eq!(added?.quantity, 2);

        let (first, second) = tokio::join!(
            carts.add_item(&owner, lamp, 1),
            carts.add_item(&owner, mug, 3),
        );

        first?;
        second?;

        let cart = carts.get_cart(&owner).await?;

        assert_eq!(cart.lines.len(), 3);
        assert_eq!(cart.line(towel).map(|line| line.quantity), Some(4));
        assert_eq!(cart.line(mug).map(|line| line.quantity), Some(5));
        assert_eq!(cart.line(lamp).map(|line| line.quantity), Some(1));

        Ok(())
    }
}
