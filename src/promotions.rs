//! Promotion rules
//!
//! Code-gated discounts bounded by a validity window, a usage cap and a minimum order amount.
//! [`PromotionTerms::evaluate`] is the single place where eligibility and discount are decided;
//! callers repeat it whenever they need an authoritative answer.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Maximum length of a promotion code.
pub const MAX_CODE_LENGTH: usize = 32;

/// A normalised, case-insensitive promotion code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromotionCode(String);

/// Reasons a raw string is not a usable promotion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPromotionCode {
    /// The code is blank.
    #[error("promotion code is empty")]
    Empty,

    /// The code is longer than [`MAX_CODE_LENGTH`].
    #[error("promotion code is longer than {MAX_CODE_LENGTH} characters")]
    TooLong,

    /// The code contains something other than ASCII letters, digits, `-` or `_`.
    #[error("promotion code may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

impl PromotionCode {
    /// Trims and upper-cases a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPromotionCode`] for blank, overlong or non-alphanumeric input.
    pub fn parse(raw: &str) -> Result<Self, InvalidPromotionCode> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(InvalidPromotionCode::Empty);
        }

        if trimmed.len() > MAX_CODE_LENGTH {
            return Err(InvalidPromotionCode::TooLong);
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidPromotionCode::InvalidCharacter);
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PromotionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PromotionCode {
    type Err = InvalidPromotionCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PromotionCode {
    type Error = InvalidPromotionCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PromotionCode> for String {
    fn from(code: PromotionCode) -> Self {
        code.0
    }
}

/// How a promotion's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    /// `value` percent of the subtotal.
    Percentage,

    /// A fixed amount off the subtotal.
    Fixed,
}

impl PromotionKind {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl FromStr for PromotionKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Operator-controlled promotion status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    /// Redeemable, subject to the other rules.
    #[default]
    Active,

    /// Switched off by an operator.
    Inactive,

    /// Marked as past its campaign.
    Expired,
}

impl PromotionStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for PromotionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A stored value did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Why a promotion code cannot be applied, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// No promotion with this code exists.
    NotFound,

    /// The promotion is switched off or its window has not opened yet.
    Inactive,

    /// The promotion's window has closed.
    Expired,

    /// The promotion has been redeemed as often as allowed.
    UsageLimitReached,

    /// The subtotal is below the promotion's minimum order amount.
    MinOrderNotMet {
        /// The minimum subtotal required.
        minimum: Decimal,
    },
}

impl Rejection {
    /// Stable machine-readable reason.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::MinOrderNotMet { .. } => "min_order_not_met",
        }
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("promotion code not found"),
            Self::Inactive => f.write_str("promotion code is not active"),
            Self::Expired => f.write_str("promotion code has expired"),
            Self::UsageLimitReached => f.write_str("promotion code usage limit reached"),
            Self::MinOrderNotMet { minimum } => {
                write!(f, "minimum order of {minimum} required")
            }
        }
    }
}

/// Terms that are invalid for a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTerms {
    /// A percentage outside `(0, 100]`.
    #[error("percentage value must be greater than 0 and at most 100")]
    PercentageOutOfRange,

    /// A fixed amount that is not positive.
    #[error("fixed value must be greater than 0")]
    NonPositiveAmount,

    /// A negative threshold.
    #[error("{0} must not be negative")]
    NegativeThreshold(&'static str),

    /// `valid_until` is before `valid_from`.
    #[error("validity window ends before it starts")]
    InvertedWindow,

    /// The usage limit is below the redemptions already recorded.
    #[error("usage limit is below the current usage count")]
    UsageLimitBelowCount,
}

/// The rule set of a single promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionTerms {
    /// Percentage or fixed.
    pub kind: PromotionKind,

    /// Percent (for [`PromotionKind::Percentage`]) or amount (for [`PromotionKind::Fixed`]).
    pub value: Decimal,

    /// Minimum subtotal required, if any.
    pub min_order_amount: Option<Decimal>,

    /// Upper bound on the computed discount, if any.
    pub max_discount: Option<Decimal>,

    /// Maximum number of redemptions, if any.
    pub usage_limit: Option<u64>,

    /// Redemptions so far.
    pub usage_count: u64,

    /// Start of the validity window.
    pub valid_from: Timestamp,

    /// End of the validity window, if any.
    pub valid_until: Option<Timestamp>,

    /// Operator-controlled status.
    pub status: PromotionStatus,
}

impl PromotionTerms {
    /// Checks the terms are internally consistent.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidTerms`] found.
    pub fn check(&self) -> Result<(), InvalidTerms> {
        match self.kind {
            PromotionKind::Percentage if self.value <= Decimal::ZERO || self.value > ONE_HUNDRED => {
                return Err(InvalidTerms::PercentageOutOfRange);
            }
            PromotionKind::Fixed if self.value <= Decimal::ZERO => {
                return Err(InvalidTerms::NonPositiveAmount);
            }
            PromotionKind::Percentage | PromotionKind::Fixed => {}
        }

        if self.min_order_amount.is_some_and(|v| v < Decimal::ZERO) {
            return Err(InvalidTerms::NegativeThreshold("min_order_amount"));
        }

        if self.max_discount.is_some_and(|v| v < Decimal::ZERO) {
            return Err(InvalidTerms::NegativeThreshold("max_discount"));
        }

        if self.valid_until.is_some_and(|until| until < self.valid_from) {
            return Err(InvalidTerms::InvertedWindow);
        }

        if self.usage_limit.is_some_and(|limit| limit < self.usage_count) {
            return Err(InvalidTerms::UsageLimitBelowCount);
        }

        Ok(())
    }

    /// Whether the promotion can still be redeemed at `now`, ignoring the order amount.
    ///
    /// # Errors
    ///
    /// Returns the highest-priority [`Rejection`] that applies.
    pub fn check_redeemable(&self, now: Timestamp) -> Result<(), Rejection> {
        if self.status == PromotionStatus::Inactive || now < self.valid_from {
            return Err(Rejection::Inactive);
        }

        if self.status == PromotionStatus::Expired || self.valid_until.is_some_and(|until| now > until)
        {
            return Err(Rejection::Expired);
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
        {
            return Err(Rejection::UsageLimitReached);
        }

        Ok(())
    }

    /// Validates the promotion against a subtotal and returns the discount it grants.
    ///
    /// # Errors
    ///
    /// Returns the highest-priority [`Rejection`] that applies.
    pub fn evaluate(&self, subtotal: Decimal, now: Timestamp) -> Result<Decimal, Rejection> {
        self.check_redeemable(now)?;

        if let Some(minimum) = self.min_order_amount
            && subtotal < minimum
        {
            return Err(Rejection::MinOrderNotMet { minimum });
        }

        Ok(self.discount_for(subtotal))
    }

    /// Discount granted on `subtotal`, without any eligibility checks.
    ///
    /// Always within `[0, subtotal]`, and within `max_discount` when one is configured.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let subtotal = subtotal.max(Decimal::ZERO);

        let raw = match self.kind {
            PromotionKind::Percentage => subtotal * self.value / ONE_HUNDRED,
            PromotionKind::Fixed => self.value,
        };

        let capped = match self.max_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        };

        capped.max(Decimal::ZERO).min(subtotal)
    }
}

/// Validates an optional promotion, mapping a missing one to [`Rejection::NotFound`].
///
/// # Errors
///
/// Returns the highest-priority [`Rejection`] that applies.
pub fn validate(
    terms: Option<&PromotionTerms>,
    subtotal: Decimal,
    now: Timestamp,
) -> Result<Decimal, Rejection> {
    terms
        .ok_or(Rejection::NotFound)
        .and_then(|terms| terms.evaluate(subtotal, now))
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;

    fn dec(value: &str) -> Result<Decimal, rust_decimal::Error> {
        Decimal::from_str(value)
    }

    fn terms(kind: PromotionKind, value: Decimal) -> PromotionTerms {
        PromotionTerms {
            kind,
            value,
            min_order_amount: None,
            max_discount: None,
            usage_limit: None,
            usage_count: 0,
            valid_from: Timestamp::UNIX_EPOCH,
            valid_until: None,
            status: PromotionStatus::Active,
        }
    }

    #[test]
    fn codes_are_normalised_to_upper_case() -> TestResult {
        assert_eq!(PromotionCode::parse("  percent10 ")?.as_str(), "PERCENT10");
        assert_eq!(PromotionCode::parse("Percent10")?, PromotionCode::parse("PERCENT10")?);

        Ok(())
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert_eq!(PromotionCode::parse("   "), Err(InvalidPromotionCode::Empty));
        assert_eq!(
            PromotionCode::parse("TEN OFF"),
            Err(InvalidPromotionCode::InvalidCharacter)
        );
        assert_eq!(
            PromotionCode::parse(&"X".repeat(MAX_CODE_LENGTH + 1)),
            Err(InvalidPromotionCode::TooLong)
        );
    }

    #[test]
    fn percentage_discount_without_cap() -> TestResult {
        let promo = terms(PromotionKind::Percentage, dec("10")?);

        assert_eq!(promo.evaluate(dec("25")?, Timestamp::now()), Ok(dec("2.5")?));

        Ok(())
    }

    #[test]
    fn percentage_discount_is_capped() -> TestResult {
        let mut promo = terms(PromotionKind::Percentage, dec("50")?);
        promo.max_discount = Some(dec("20")?);

        assert_eq!(promo.discount_for(dec("100")?), dec("20")?);
        assert_eq!(promo.discount_for(dec("30")?), dec("15")?);

        Ok(())
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() -> TestResult {
        let promo = terms(PromotionKind::Fixed, dec("15")?);

        assert_eq!(promo.discount_for(dec("40")?), dec("15")?);
        assert_eq!(promo.discount_for(dec("9.5")?), dec("9.5")?);
        assert_eq!(promo.discount_for(Decimal::ZERO), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn min_order_not_met_below_threshold() -> TestResult {
        let mut promo = terms(PromotionKind::Percentage, dec("10")?);
        promo.min_order_amount = Some(dec("50")?);

        assert_eq!(
            promo.evaluate(dec("25")?, Timestamp::now()),
            Err(Rejection::MinOrderNotMet {
                minimum: dec("50")?
            })
        );
        assert_eq!(promo.evaluate(dec("50")?, Timestamp::now()), Ok(dec("5")?));

        Ok(())
    }

    #[test]
    fn expired_promotion_rejected_regardless_of_usage() -> TestResult {
        let now = Timestamp::now();

        let mut promo = terms(PromotionKind::Fixed, dec("5")?);
        promo.usage_limit = Some(1_000);
        promo.usage_count = 0;
        promo.valid_until = Some(now.checked_sub(1.hour())?);

        assert_eq!(promo.evaluate(dec("100")?, now), Err(Rejection::Expired));

        Ok(())
    }

    #[test]
    fn rejection_priority_order() -> TestResult {
        let now = Timestamp::now();

        let mut promo = terms(PromotionKind::Fixed, dec("5")?);
        promo.status = PromotionStatus::Inactive;
        promo.valid_until = Some(now.checked_sub(1.hour())?);
        promo.usage_limit = Some(1);
        promo.usage_count = 1;
        promo.min_order_amount = Some(dec("100")?);

        assert_eq!(promo.evaluate(dec("1")?, now), Err(Rejection::Inactive));

        promo.status = PromotionStatus::Active;
        assert_eq!(promo.evaluate(dec("1")?, now), Err(Rejection::Expired));

        promo.valid_until = None;
        assert_eq!(promo.evaluate(dec("1")?, now), Err(Rejection::UsageLimitReached));

        promo.usage_limit = None;
        assert!(matches!(
            promo.evaluate(dec("1")?, now),
            Err(Rejection::MinOrderNotMet { .. })
        ));

        assert_eq!(validate(None, dec("1")?, now), Err(Rejection::NotFound));

        Ok(())
    }

    #[test]
    fn window_not_yet_open_is_inactive() -> TestResult {
        let now = Timestamp::now();

        let mut promo = terms(PromotionKind::Fixed, dec("5")?);
        promo.valid_from = now.checked_add(1.hour())?;

        assert_eq!(promo.evaluate(dec("10")?, now), Err(Rejection::Inactive));

        Ok(())
    }

    #[test]
    fn terms_check_rejects_bad_values() -> TestResult {
        assert_eq!(
            terms(PromotionKind::Percentage, dec("101")?).check(),
            Err(InvalidTerms::PercentageOutOfRange)
        );
        assert_eq!(
            terms(PromotionKind::Fixed, Decimal::ZERO).check(),
            Err(InvalidTerms::NonPositiveAmount)
        );

        let mut promo = terms(PromotionKind::Fixed, dec("1")?);
        promo.usage_limit = Some(2);
        promo.usage_count = 3;

        assert_eq!(promo.check(), Err(InvalidTerms::UsageLimitBelowCount));

        Ok(())
    }

    #[test]
    fn discount_bounds_hold_across_subtotals() -> TestResult {
        let mut percentage = terms(PromotionKind::Percentage, dec("37.5")?);
        percentage.max_discount = Some(dec("12")?);

        let fixed = terms(PromotionKind::Fixed, dec("18")?);

        for cents in (0..20_000).step_by(137) {
            let subtotal = Decimal::new(cents, 2);

            for promo in [&percentage, &fixed] {
                let discount = promo.discount_for(subtotal);

                assert!(discount >= Decimal::ZERO, "negative discount at {subtotal}");
                assert!(discount <= subtotal, "discount above subtotal at {subtotal}");

                if let Some(cap) = promo.max_discount {
                    assert!(discount <= cap, "discount above cap at {subtotal}");
                }
            }
        }

        Ok(())
    }
}
