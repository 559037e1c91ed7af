//! Order ledger.
//!
//! The storage seam that commits stock, promotion usage and the order itself as one unit.

use async_trait::async_trait;
use checkout::{FulfillmentStatus, PaymentStatus};
use mockall::automock;

use crate::domain::{
    identity::UserUuid,
    orders::{
        errors::LedgerError,
        models::{Order, OrderUuid},
    },
};

#[automock]
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Atomically decrement stock for every line, write the order and its lines, and count
    /// one redemption of the order's promotion.
    ///
    /// Either everything is written or nothing is. Stock is only decremented where enough
    /// remains; usage is only counted while the promotion is active, inside its window and
    /// under its limit.
    async fn commit(&self, order: &Order) -> Result<Order, LedgerError>;

    /// The order an owner created with an idempotency key, if any.
    ///
    /// Keys are scoped to `owner_key`; another owner's order is never returned.
    async fn find_by_idempotency_key(
        &self,
        owner_key: &str,
        key: &str,
    ) -> Result<Option<Order>, LedgerError>;

    async fn get(&self, order: OrderUuid) -> Result<Option<Order>, LedgerError>;

    async fn find_by_number(&self, number: &str) -> Result<Option<Order>, LedgerError>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user: UserUuid) -> Result<Vec<Order>, LedgerError>;

    /// Every order, newest first, optionally only those in one fulfilment status.
    async fn list_orders(
        &self,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<Order>, LedgerError>;

    /// Compare-and-set the fulfilment status; `None` when the order is missing or its status
    /// is no longer `from`.
    async fn update_status(
        &self,
        order: OrderUuid,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    ) -> Result<Option<Order>, LedgerError>;

    /// Set the payment status; `None` when the order is missing.
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<Option<Order>, LedgerError>;
}
