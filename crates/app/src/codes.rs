//! Generated codes

use checkout::{PromotionCode, promotions::InvalidPromotionCode};
use jiff::{Timestamp, tz::TimeZone};
use rand::{Rng, distributions::Uniform};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated promotion codes.
pub const PROMOTION_CODE_LENGTH: usize = 8;

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "KN";

const ORDER_NUMBER_SUFFIX_LENGTH: usize = 6;

fn random_chars<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let index = Uniform::new(0, ALPHABET.len());

    (0..len)
        .map(|_| rng.sample(&index))
        .filter_map(|i| ALPHABET.get(i).copied().map(char::from))
        .collect()
}

/// Generates a random promotion code over `A-Z0-9`.
///
/// # Errors
///
/// Only fails if the alphabet and code rules ever disagree.
pub fn generate_promotion_code<R: Rng + ?Sized>(
    rng: &mut R,
) -> Result<PromotionCode, InvalidPromotionCode> {
    PromotionCode::parse(&random_chars(rng, PROMOTION_CODE_LENGTH))
}

/// Generates a human-readable order number such as `KN261018X7Q2ZD`.
pub fn generate_order_number<R: Rng + ?Sized>(rng: &mut R, now: Timestamp) -> String {
    let date = now.to_zoned(TimeZone::UTC).strftime("%y%m%d");

    format!(
        "{ORDER_NUMBER_PREFIX}{date}{}",
        random_chars(rng, ORDER_NUMBER_SUFFIX_LENGTH)
    )
}
