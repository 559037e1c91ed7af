//! Catalog gateway.

use async_trait::async_trait;
use mockall::automock;

use crate::domain::catalog::{
    errors::CatalogError,
    models::{CatalogProduct, ProductUuid},
};

#[automock]
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch the current state of a product.
    async fn get_product(&self, product: ProductUuid) -> Result<CatalogProduct, CatalogError>;
}
