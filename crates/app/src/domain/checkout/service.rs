//! Checkout Service

use std::sync::Arc;

use async_trait::async_trait;
use checkout::{FulfillmentStatus, PaymentStatus, PricedLine, Rejection, pricing};
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{Span, error, info, warn};

use crate::{
    codes::generate_order_number,
    domain::{
        carts::{
            CartsService,
            models::{Cart, CartOwner},
        },
        catalog::{CatalogError, CatalogGateway, models::ProductUuid},
        checkout::{
            errors::{CheckoutError, FinalizeError},
            models::{CartSummary, FinalizeRequest, ResolvedLine},
            payment::{HeldAuthorization, PaymentAuthorizer, gateway_idempotency_key},
            settings::CheckoutSettings,
        },
        orders::{
            LedgerError, OrderLedger,
            models::{Order, OrderLine, OrderLineUuid, OrderUuid},
        },
        promotions::{PromotionsService, models::PromotionValidation},
    },
    errors::Classify,
};

#[derive(Clone)]
pub struct DefaultCheckoutService {
    carts: Arc<dyn CartsService>,
    catalog: Arc<dyn CatalogGateway>,
    promotions: Arc<dyn PromotionsService>,
    ledger: Arc<dyn OrderLedger>,
    payments: Arc<dyn PaymentAuthorizer>,
    settings: CheckoutSettings,
}

impl std::fmt::Debug for DefaultCheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCheckoutService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl DefaultCheckoutService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        catalog: Arc<dyn CatalogGateway>,
        promotions: Arc<dyn PromotionsService>,
        ledger: Arc<dyn OrderLedger>,
        payments: Arc<dyn PaymentAuthorizer>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            carts,
            catalog,
            promotions,
            ledger,
            payments,
            settings,
        }
    }

    async fn finalize_with_retries(
        &self,
        owner: &CartOwner,
        request: &FinalizeRequest,
    ) -> Result<Order, FinalizeError> {
        let mut attempt: u32 = 1;

        loop {
            match self.finalize_once(owner, request).await {
                Err(error)
                    if error.class().is_retryable() && attempt < self.settings.max_attempts =>
                {
                    warn!(attempt, error = %error, "transient finalization failure, retrying");

                    tokio::time::sleep(self.settings.retry_backoff * attempt).await;

                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn finalize_once(
        &self,
        owner: &CartOwner,
        request: &FinalizeRequest,
    ) -> Result<Order, FinalizeError> {
        let cart = self.carts.get_cart(owner).await?;

        if cart.is_empty() {
            return Err(FinalizeError::EmptyCart);
        }

        let now = Timestamp::now();

        let mut priced = Vec::with_capacity(cart.lines.len());
        let mut lines = Vec::with_capacity(cart.lines.len());

        for line in &cart.lines {
            let product = match self.catalog.get_product(line.product_uuid).await {
                Ok(product) if product.is_purchasable() => product,
                Ok(_) | Err(CatalogError::NotFound) => {
                    return Err(FinalizeError::StaleCart {
                        product: line.product_uuid,
                    });
                }
                Err(error) => return Err(error.into()),
            };

            priced.push(PricedLine::new(product.price, line.quantity));

            lines.push(OrderLine {
                uuid: OrderLineUuid::new(),
                product_uuid: product.uuid,
                product_name: product.name,
                sku: product.sku,
                unit_price: product.price,
                quantity: line.quantity,
            });
        }

        let subtotal = pricing::subtotal(&priced);

        let promotion = match &cart.promotion_code {
            None => None,
            Some(code) => match self
                .promotions
                .check_code(code.as_str(), subtotal, now)
                .await?
            {
                PromotionValidation::Applied {
                    promotion,
                    discount,
                } => Some((promotion, discount)),
                PromotionValidation::Rejected {
                    reason: Rejection::UsageLimitReached,
                    ..
                } => return Err(FinalizeError::UsageLimitReached),
                PromotionValidation::Rejected { reason, .. } => {
                    return Err(FinalizeError::PromotionInvalid(reason));
                }
            },
        };

        let discount = promotion
            .as_ref()
            .map_or(Decimal::ZERO, |(_, discount)| *discount);

        let breakdown = pricing::compose(&priced, discount, &self.settings.policy).rounded();

        if (breakdown.total - request.expected_total).abs() > self.settings.price_tolerance {
            return Err(FinalizeError::PriceMismatch {
                expected: request.expected_total,
                actual: breakdown.total,
            });
        }

        let order_number = generate_order_number(&mut rand::thread_rng(), now);

        let (promotion_uuid, promotion_code) = match promotion {
            Some((promotion, _)) => (Some(promotion.uuid), Some(promotion.code)),
            None => (None, None),
        };

        let mut order = Order {
            uuid: OrderUuid::new(),
            order_number,
            idempotency_key: request.idempotency_key.trim().to_string(),
            owner_key: owner.key(),
            user_uuid: owner.user(),
            email: request.email.trim().to_string(),
            status: FulfillmentStatus::Pending,
            payment_status: PaymentStatus::Paid,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
            shipping_address: request.shipping_address.clone(),
            billing_address: request.billing_address().clone(),
            promotion_uuid,
            promotion_code,
            payment_reference: None,
            lines,
            created_at: now,
            updated_at: now,
        };

        order.set_totals(&breakdown);

        if !order.totals_are_consistent() {
            error!(
                order_uuid = %order.uuid,
                subtotal = %order.subtotal,
                total = %order.total,
                "refusing to commit order with inconsistent totals"
            );

            return Err(FinalizeError::InconsistentTotals);
        }

        let authorization = self
            .payments
            .authorize(
                &request.payment_token,
                order.total,
                &gateway_idempotency_key(&order.owner_key, &order.idempotency_key),
            )
            .await?;

        order.payment_reference = Some(authorization.reference.clone());

        // Voided on drop if the commit below never completes.
        let held = HeldAuthorization::new(Arc::clone(&self.payments), authorization);

        match self.ledger.commit(&order).await {
            Ok(committed) => {
                held.keep();

                Ok(committed)
            }
            Err(error) => {
                held.void().await;

                if matches!(error, LedgerError::DuplicateIdempotencyKey) {
                    info!("order already committed for idempotency key");

                    return self
                        .ledger
                        .find_by_idempotency_key(&order.owner_key, &order.idempotency_key)
                        .await?
                        .ok_or(FinalizeError::Ledger(error));
                }

                Err(error.into())
            }
        }
    }

    async fn resolve_lines(
        &self,
        owner: &CartOwner,
    ) -> Result<(Cart, Vec<ResolvedLine>, Vec<ProductUuid>), CheckoutError> {
        let cart = self.carts.get_cart(owner).await?;

        let mut resolved = Vec::with_capacity(cart.lines.len());
        let mut unavailable = Vec::new();

        for line in &cart.lines {
            match self.catalog.get_product(line.product_uuid).await {
                Ok(product) if product.is_purchasable() => resolved.push(ResolvedLine {
                    product_uuid: product.uuid,
                    name: product.name,
                    sku: product.sku,
                    unit_price: product.price,
                    quantity: line.quantity,
                    stock_quantity: product.stock_quantity,
                }),
                Ok(_) | Err(CatalogError::NotFound) => unavailable.push(line.product_uuid),
                Err(error) => return Err(error.into()),
            }
        }

        Ok((cart, resolved, unavailable))
    }
}

fn priced_lines(lines: &[ResolvedLine]) -> Vec<PricedLine> {
    lines
        .iter()
        .map(|line| PricedLine::new(line.unit_price, line.quantity))
        .collect()
}

#[async_trait]
impl CheckoutService for DefaultCheckoutService {
    #[tracing::instrument(name = "checkout.service.summary", skip(self), fields(owner = %owner), err)]
    async fn summary(&self, owner: &CartOwner) -> Result<CartSummary, CheckoutError> {
        let (cart, lines, unavailable) = self.resolve_lines(owner).await?;

        let priced = priced_lines(&lines);
        let subtotal = pricing::subtotal(&priced);

        let promotion = match &cart.promotion_code {
            Some(code) => Some(
                self.promotions
                    .check_code(code.as_str(), subtotal, Timestamp::now())
                    .await?,
            ),
            None => None,
        };

        let discount = promotion
            .as_ref()
            .map_or(Decimal::ZERO, PromotionValidation::discount);

        let breakdown = pricing::compose(&priced, discount, &self.settings.policy).rounded();

        Ok(CartSummary {
            cart_uuid: cart.uuid,
            lines,
            unavailable,
            promotion,
            breakdown,
        })
    }

    #[tracing::instrument(
        name = "checkout.service.apply_promotion",
        skip(self),
        fields(owner = %owner, applied = tracing::field::Empty),
        err
    )]
    async fn apply_promotion(
        &self,
        owner: &CartOwner,
        code: &str,
    ) -> Result<PromotionValidation, CheckoutError> {
        let (cart, lines, _) = self.resolve_lines(owner).await?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let subtotal = pricing::subtotal(&priced_lines(&lines));

        let validation = self
            .promotions
            .check_code(code, subtotal, Timestamp::now())
            .await?;

        Span::current().record("applied", validation.is_applied());

        if let PromotionValidation::Applied { promotion, .. } = &validation {
            self.carts
                .set_promotion_code(owner, Some(promotion.code.clone()))
                .await?;
        }

        Ok(validation)
    }

    async fn remove_promotion(&self, owner: &CartOwner) -> Result<(), CheckoutError> {
        self.carts.set_promotion_code(owner, None).await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "checkout.service.finalize",
        skip(self, request),
        fields(owner = %owner, order_uuid = tracing::field::Empty),
        err
    )]
    async fn finalize(
        &self,
        owner: &CartOwner,
        request: FinalizeRequest,
    ) -> Result<Order, FinalizeError> {
        request.validate()?;

        if let Some(existing) = self
            .ledger
            .find_by_idempotency_key(&owner.key(), request.idempotency_key.trim())
            .await?
        {
            info!(order_uuid = %existing.uuid, "returning existing order for idempotency key");

            return Ok(existing);
        }

        let order = match tokio::time::timeout(
            self.settings.timeout,
            self.finalize_with_retries(owner, &request),
        )
        .await
        {
            Ok(result) => result?,
            Err(_elapsed) => {
                warn!(timeout = ?self.settings.timeout, "finalization timed out");

                return Err(FinalizeError::Timeout);
            }
        };

        Span::current().record("order_uuid", tracing::field::display(order.uuid));

        if let Err(error) = self.carts.clear(owner).await {
            warn!(error = %error, "failed to clear cart after finalization");
        }

        info!(order_number = %order.order_number, total = %order.total, "finalized order");

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Resolve the cart against the catalog and price it.
    async fn summary(&self, owner: &CartOwner) -> Result<CartSummary, CheckoutError>;

    /// Check a code against the cart and remember it when it applies.
    async fn apply_promotion(
        &self,
        owner: &CartOwner,
        code: &str,
    ) -> Result<PromotionValidation, CheckoutError>;

    /// Forget the applied code.
    async fn remove_promotion(&self, owner: &CartOwner) -> Result<(), CheckoutError>;

    /// Turn the cart into an order.
    async fn finalize(
        &self,
        owner: &CartOwner,
        request: FinalizeRequest,
    ) -> Result<Order, FinalizeError>;
}
