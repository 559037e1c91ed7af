//! Payment authorization.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::warn;
use uuid::Uuid;

const DECLINE_PREFIX: &str = "decline";

/// A hold placed on the shopper's payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAuthorization {
    pub reference: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
}

/// Opaque payment gateway.
#[automock]
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    /// Authorize `amount` against `token`. The idempotency key is forwarded so a gateway can
    /// collapse repeated attempts.
    async fn authorize(
        &self,
        token: &str,
        amount: Decimal,
        idempotency_key: &str,
    ) -> Result<PaymentAuthorization, PaymentError>;

    /// Release an authorization that will not be captured.
    async fn void(&self, authorization: &PaymentAuthorization) -> Result<(), PaymentError>;
}

/// Key forwarded to the gateway for one owner's idempotency key.
///
/// Two owners reusing the same key must not collapse into one gateway attempt, and the
/// owner key itself (a guest session token) never leaves the process.
#[must_use]
pub fn gateway_idempotency_key(owner_key: &str, idempotency_key: &str) -> String {
    let name = format!("{owner_key}\n{idempotency_key}");

    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
        .simple()
        .to_string()
}

pub(crate) async fn void_or_warn(
    payments: &dyn PaymentAuthorizer,
    authorization: &PaymentAuthorization,
) {
    if let Err(error) = payments.void(authorization).await {
        warn!(
            reference = %authorization.reference,
            error = %error,
            "failed to void payment authorization"
        );
    }
}

/// An authorization that is voided unless [`kept`](Self::keep).
///
/// Dropping the guard, for example when the finalization future is cancelled by its
/// timeout, spawns the void on the current runtime.
pub(crate) struct HeldAuthorization {
    payments: Arc<dyn PaymentAuthorizer>,
    authorization: Option<PaymentAuthorization>,
}

impl std::fmt::Debug for HeldAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeldAuthorization")
            .field("authorization", &self.authorization)
            .finish_non_exhaustive()
    }
}

impl HeldAuthorization {
    pub(crate) fn new(
        payments: Arc<dyn PaymentAuthorizer>,
        authorization: PaymentAuthorization,
    ) -> Self {
        Self {
            payments,
            authorization: Some(authorization),
        }
    }

    /// The order was committed; the authorization stays in place.
    pub(crate) fn keep(mut self) {
        self.authorization = None;
    }

    pub(crate) async fn void(mut self) {
        if let Some(authorization) = self.authorization.take() {
            void_or_warn(self.payments.as_ref(), &authorization).await;
        }
    }
}

impl Drop for HeldAuthorization {
    fn drop(&mut self) {
        let Some(authorization) = self.authorization.take() else {
            return;
        };

        warn!(
            reference = %authorization.reference,
            "finalization abandoned after authorization, voiding"
        );

        match Handle::try_current() {
            Ok(handle) => {
                let payments = Arc::clone(&self.payments);

                handle.spawn(async move {
                    void_or_warn(payments.as_ref(), &authorization).await;
                });
            }
            Err(_no_runtime) => warn!(
                reference = %authorization.reference,
                "no runtime available to void payment authorization"
            ),
        }
    }
}

/// Approves every token except those starting with `decline`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoPaymentAuthorizer;

#[async_trait]
impl PaymentAuthorizer for DemoPaymentAuthorizer {
    async fn authorize(
        &self,
        token: &str,
        amount: Decimal,
        _idempotency_key: &str,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(PaymentError::Declined("missing payment token".to_string()));
        }

        if token.to_ascii_lowercase().starts_with(DECLINE_PREFIX) {
            return Err(PaymentError::Declined("card declined".to_string()));
        }

        Ok(PaymentAuthorization {
            reference: format!("auth_{}", Uuid::now_v7().simple()),
            amount,
        })
    }

    async fn void(&self, _authorization: &PaymentAuthorization) -> Result<(), PaymentError> {
        Ok(())
    }
}
