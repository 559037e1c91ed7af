//! Postal addresses

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_FIELD_LENGTH: usize = 200;

/// Problems found while validating an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A required field is blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A field is longer than allowed.
    #[error("{0} is too long")]
    TooLong(&'static str),

    /// The country is not a two-letter code.
    #[error("country must be a two-letter ISO 3166 code")]
    InvalidCountry,
}

/// Address fields as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UnvalidatedAddress {
    /// Recipient name.
    pub name: String,

    /// First address line.
    pub line1: String,

    /// Second address line.
    #[serde(default)]
    pub line2: Option<String>,

    /// City.
    pub city: String,

    /// State, county or region.
    #[serde(default)]
    pub state: Option<String>,

    /// Postal code.
    pub postal_code: String,

    /// Two-letter country code.
    pub country: String,

    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// A validated, trimmed postal address.
///
/// Order records keep a copy of this value, so it never refers to anything mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UnvalidatedAddress")]
pub struct Address {
    name: String,
    line1: String,
    line2: Option<String>,
    city: String,
    state: Option<String>,
    postal_code: String,
    country: String,
    phone: Option<String>,
}

fn required(field: &'static str, value: &str) -> Result<String, AddressError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(AddressError::Missing(field));
    }

    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(AddressError::TooLong(field));
    }

    Ok(value.to_string())
}

fn optional(field: &'static str, value: Option<&str>) -> Result<Option<String>, AddressError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required(field, value).map(Some),
    }
}

impl Address {
    /// Validates raw address fields.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] for blank required fields, overlong fields or a malformed
    /// country code.
    pub fn parse(raw: &UnvalidatedAddress) -> Result<Self, AddressError> {
        let country = required("country", &raw.country)?.to_ascii_uppercase();

        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AddressError::InvalidCountry);
        }

        Ok(Self {
            name: required("name", &raw.name)?,
            line1: required("line1", &raw.line1)?,
            line2: optional("line2", raw.line2.as_deref())?,
            city: required("city", &raw.city)?,
            state: optional("state", raw.state.as_deref())?,
            postal_code: required("postal_code", &raw.postal_code)?,
            country,
            phone: optional("phone", raw.phone.as_deref())?,
        })
    }

    /// Recipient name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First address line.
    pub fn line1(&self) -> &str {
        &self.line1
    }

    /// Second address line.
    pub fn line2(&self) -> Option<&str> {
        self.line2.as_deref()
    }

    /// City.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State, county or region.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Postal code.
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Upper-case two-letter country code.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Contact phone number.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl TryFrom<UnvalidatedAddress> for Address {
    type Error = AddressError;

    fn try_from(raw: UnvalidatedAddress) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

/// Checks an email address has a plausible `local@domain.tld` shape.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn raw() -> UnvalidatedAddress {
        UnvalidatedAddress {
            name: " Wanjiru Kamau ".to_string(),
            line1: "12 Moi Avenue".to_string(),
            line2: Some("   ".to_string()),
            city: "Nairobi".to_string(),
            state: None,
            postal_code: "00100".to_string(),
            country: "ke".to_string(),
            phone: Some("+254700000000".to_string()),
        }
    }

    #[test]
    fn parse_trims_and_normalises() -> TestResult {
        let address = Address::parse(&raw())?;

        assert_eq!(address.name(), "Wanjiru Kamau");
        assert_eq!(address.line2(), None);
        assert_eq!(address.country(), "KE");
        assert_eq!(address.phone(), Some("+254700000000"));

        Ok(())
    }

    #[test]
    fn parse_rejects_missing_fields() {
        let mut missing_city = raw();
        missing_city.city = String::new();

        assert_eq!(
            Address::parse(&missing_city),
            Err(AddressError::Missing("city"))
        );
    }

    #[test]
    fn parse_rejects_bad_country() {
        let mut bad_country = raw();
        bad_country.country = "Kenya".to_string();

        assert_eq!(Address::parse(&bad_country), Err(AddressError::InvalidCountry));
    }

    #[test]
    fn deserialize_validates() -> TestResult {
        let json = r#"{"name":"A","line1":"B","city":"C","postal_code":"1","country":"us"}"#;
        let address: Address = serde_json::from_str(json)?;

        assert_eq!(address.country(), "US");

        let invalid = r#"{"name":"","line1":"B","city":"C","postal_code":"1","country":"us"}"#;

        assert!(serde_json::from_str::<Address>(invalid).is_err());

        Ok(())
    }

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("shopper@example.com"));
        assert!(!is_plausible_email("shopper@localhost"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a b@example.com"));
    }
}
