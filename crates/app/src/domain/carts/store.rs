//! Cart storage.

use async_trait::async_trait;
use checkout::PromotionCode;
use mockall::automock;

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        models::{Cart, CartOwner},
    },
    catalog::models::ProductUuid,
};

/// Per-line cart persistence.
///
/// Every write touches a single line or the cart header; there is no whole-cart overwrite.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load a cart, or an empty one if the owner has none.
    async fn load(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError>;

    /// Add `quantity` to a line, creating the cart and line as needed.
    ///
    /// Returns the new line quantity, or `None` when it would exceed `max_quantity`, in which
    /// case nothing is written.
    async fn add_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
        max_quantity: u32,
    ) -> Result<Option<u32>, CartsServiceError>;

    /// Overwrite the quantity of an existing line; `false` when there is no such line.
    async fn set_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, CartsServiceError>;

    /// Remove a line if present.
    async fn remove_line(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError>;

    /// Remove the whole cart.
    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError>;

    /// Store or clear the applied promotion code.
    async fn set_promotion_code(
        &self,
        owner: &CartOwner,
        code: Option<PromotionCode>,
    ) -> Result<(), CartsServiceError>;
}
