//! Catalog Models

use std::str::FromStr;

use checkout::promotions::UnknownVariant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Marker for product identifiers.
#[derive(Debug)]
pub struct ProductRecord;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Publication status of a product.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Draft => "draft",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "draft" => Ok(Self::Draft),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Live product facts needed to price and fulfil a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub uuid: ProductUuid,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    pub stock_quantity: u32,
    #[serde(default)]
    pub status: ProductStatus,
}

impl CatalogProduct {
    /// Only active products can be put in a cart or bought.
    pub fn is_purchasable(&self) -> bool {
        self.status == ProductStatus::Active
    }
}
