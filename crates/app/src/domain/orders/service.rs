//! Orders Service

use std::sync::Arc;

use async_trait::async_trait;
use checkout::{FulfillmentStatus, PaymentStatus};
use mockall::automock;
use tracing::info;

use crate::domain::{
    identity::UserUuid,
    orders::{
        errors::OrdersServiceError,
        ledger::OrderLedger,
        models::{Order, OrderUuid},
    },
};

#[derive(Clone)]
pub struct DefaultOrdersService {
    ledger: Arc<dyn OrderLedger>,
}

impl std::fmt::Debug for DefaultOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultOrdersService").finish_non_exhaustive()
    }
}

impl DefaultOrdersService {
    #[must_use]
    pub fn new(ledger: Arc<dyn OrderLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl OrdersService for DefaultOrdersService {
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        self.ledger
            .get(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn find_by_number(&self, number: &str) -> Result<Order, OrdersServiceError> {
        self.ledger
            .find_by_number(number)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn list_orders_for_user(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        Ok(self.ledger.list_for_user(user).await?)
    }

    async fn list_orders(
        &self,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        Ok(self.ledger.list_orders(status).await?)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        status: FulfillmentStatus,
    ) -> Result<Order, OrdersServiceError> {
        let current = self.get_order(order).await?;

        current.status.transition_to(status)?;

        let updated = self
            .ledger
            .update_status(order, current.status, status)
            .await?
            .ok_or(OrdersServiceError::ConcurrentUpdate)?;

        info!(from = %current.status, to = %status, "order status changed");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.update_payment_status",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<Order, OrdersServiceError> {
        self.ledger
            .update_payment_status(order, status)
            .await?
            .ok_or(OrdersServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Retrieve an order by its human-readable number.
    async fn find_by_number(&self, number: &str) -> Result<Order, OrdersServiceError>;

    /// A user's orders, newest first.
    async fn list_orders_for_user(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Every order, newest first, optionally filtered by fulfilment status.
    async fn list_orders(
        &self,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<Order>, OrdersServiceError>;

    /// Move an order along its fulfilment lifecycle.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: FulfillmentStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Record a payment status change.
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<Order, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::orders::MockOrderLedger,
        test::fixtures::sample_order,
    };

    use super::*;

    #[tokio::test]
    async fn update_status_follows_lifecycle() -> TestResult {
        let mut order = sample_order()?;
        order.status = FulfillmentStatus::Pending;

        let mut ledger = MockOrderLedger::new();

        let current = order.clone();
        ledger
            .expect_get()
            .returning(move |_| Ok(Some(current.clone())));

        let mut processing = order.clone();
        processing.status = FulfillmentStatus::Processing;
        ledger
            .expect_update_status()
            .withf(|_, from, to| {
                *from == FulfillmentStatus::Pending && *to == FulfillmentStatus::Processing
            })
            .times(1)
            .returning(move |_, _, _| Ok(Some(processing.clone())));

        let orders = DefaultOrdersService::new(Arc::new(ledger));

        let updated = orders
            .update_status(order.uuid, FulfillmentStatus::Processing)
            .await?;

        assert_eq!(updated.status, FulfillmentStatus::Processing);

        Ok(())
    }

    #[tokio::test]
    async fn update_status_rejects_invalid_transition() -> TestResult {
        let mut order = sample_order()?;
        order.status = FulfillmentStatus::Delivered;

        let mut ledger = MockOrderLedger::new();

        let current = order.clone();
        ledger
            .expect_get()
            .returning(move |_| Ok(Some(current.clone())));
        ledger.expect_update_status().never();

        let result = DefaultOrdersService::new(Arc::new(ledger))
            .update_status(order.uuid, FulfillmentStatus::Cancelled)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidTransition(_))),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_status_lost_race_is_conflict() -> TestResult {
        let order = sample_order()?;

        let mut ledger = MockOrderLedger::new();

        let current = order.clone();
        ledger
            .expect_get()
            .returning(move |_| Ok(Some(current.clone())));
        ledger
            .expect_update_status()
            .returning(|_, _, _| Ok(None));

        let result = DefaultOrdersService::new(Arc::new(ledger))
            .update_status(order.uuid, FulfillmentStatus::Cancelled)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::ConcurrentUpdate)),
            "expected ConcurrentUpdate, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_missing_order_is_not_found() -> TestResult {
        let mut ledger = MockOrderLedger::new();

        ledger.expect_get().returning(|_| Ok(None));

        let result = DefaultOrdersService::new(Arc::new(ledger))
            .get_order(OrderUuid::new())
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_passes_status_filter() -> TestResult {
        let order = sample_order()?;

        let mut ledger = MockOrderLedger::new();

        let listed = order.clone();
        ledger
            .expect_list_orders()
            .withf(|status| *status == Some(FulfillmentStatus::Pending))
            .times(1)
            .returning(move |_| Ok(vec![listed.clone()]));

        let orders = DefaultOrdersService::new(Arc::new(ledger))
            .list_orders(Some(FulfillmentStatus::Pending))
            .await?;

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].uuid, order.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_order_number_is_not_found() -> TestResult {
        let mut ledger = MockOrderLedger::new();

        ledger.expect_find_by_number().returning(|_| Ok(None));

        let result = DefaultOrdersService::new(Arc::new(ledger))
            .find_by_number("ORD-MISSING")
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
