//! Checkout Models

use checkout::{Address, PriceBreakdown, address::is_plausible_email};
use rust_decimal::Decimal;

use crate::domain::{
    carts::models::CartUuid,
    catalog::models::ProductUuid,
    checkout::errors::FinalizeError,
    promotions::models::PromotionValidation,
};

const MAX_IDEMPOTENCY_KEY_LENGTH: usize = 128;

/// A cart line joined with live catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub product_uuid: ProductUuid,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub stock_quantity: u32,
}

impl ResolvedLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// What the shopper sees before paying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub cart_uuid: Option<CartUuid>,
    pub lines: Vec<ResolvedLine>,

    /// Lines whose product has disappeared or been withdrawn; excluded from the price.
    pub unavailable: Vec<ProductUuid>,

    pub promotion: Option<PromotionValidation>,

    /// Rounded output figures.
    pub breakdown: PriceBreakdown,
}

/// Shopper input for finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeRequest {
    /// Total the shopper was shown.
    pub expected_total: Decimal,
    pub shipping_address: Address,

    /// Defaults to the shipping address.
    pub billing_address: Option<Address>,
    pub email: String,
    pub payment_token: String,
    pub idempotency_key: String,
}

impl FinalizeRequest {
    /// Checks everything that can be checked without touching storage.
    ///
    /// # Errors
    ///
    /// Returns the first validation [`FinalizeError`] found.
    pub fn validate(&self) -> Result<(), FinalizeError> {
        let key = self.idempotency_key.trim();

        if key.is_empty() || key.len() > MAX_IDEMPOTENCY_KEY_LENGTH {
            return Err(FinalizeError::MissingIdempotencyKey);
        }

        if self.payment_token.trim().is_empty() {
            return Err(FinalizeError::MissingPaymentToken);
        }

        if !is_plausible_email(&self.email) {
            return Err(FinalizeError::InvalidEmail);
        }

        Ok(())
    }

    pub fn billing_address(&self) -> &Address {
        self.billing_address.as_ref().unwrap_or(&self.shipping_address)
    }
}
