//! Address bodies

use checkout::{Address, UnvalidatedAddress};
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};

use crate::extensions::*;

/// Postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddressBody {
    /// Recipient name
    pub name: String,

    /// First address line
    pub line1: String,

    /// Second address line
    #[serde(default)]
    pub line2: Option<String>,

    /// City
    pub city: String,

    /// State, county or region
    #[serde(default)]
    pub state: Option<String>,

    /// Postal code
    pub postal_code: String,

    /// Two-letter ISO 3166 country code
    pub country: String,

    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl AddressBody {
    /// Validates the body into an [`Address`].
    pub(crate) fn into_address(self, field: &str) -> Result<Address, StatusError> {
        Address::parse(&UnvalidatedAddress {
            name: self.name,
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            phone: self.phone,
        })
        .or_400(field)
    }
}

impl From<&Address> for AddressBody {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name().to_string(),
            line1: address.line1().to_string(),
            line2: address.line2().map(ToString::to_string),
            city: address.city().to_string(),
            state: address.state().map(ToString::to_string),
            postal_code: address.postal_code().to_string(),
            country: address.country().to_string(),
            phone: address.phone().map(ToString::to_string),
        }
    }
}
