//! Fixed-point conversion between decimal strings and on-chain integers.
//!
//! Amounts and rates are scaled by 10^7. Parsing works on the decimal
//! string directly so `"0.1"` is exactly `1_000_000`.

use thiserror::Error;

/// Decimal places of on-chain amounts and rates.
pub const DECIMALS: u32 = 7;

/// `10^7`.
pub const SCALAR_7: i128 = 10_000_000;

/// Rate scale relative to a percent: 1% = 10^5.
const PERCENT_DECIMALS: u32 = DECIMALS - 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    NotANumber(String),

    #[error("at most {0} decimal places are allowed")]
    TooManyDecimals(u32),

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("percent must be between 0 and 100")]
    PercentOutOfRange,

    #[error("amount is too large")]
    Overflow,
}

fn split_decimal(input: &str) -> Result<(&str, &str), AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
    {
        return Err(AmountError::NotANumber(trimmed.to_string()));
    }
    Ok((whole, fraction))
}

fn scale(whole: &str, fraction: &str, decimals: u32) -> Result<i128, AmountError> {
    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(if whole.is_empty() { "0" } else { whole });
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }
    digits.parse::<i128>().map_err(|_| AmountError::Overflow)
}

/// Parse a non-negative decimal into an integer with `decimals` places.
/// More fractional digits than `decimals` is an error.
pub fn parse_fixed(input: &str, decimals: u32) -> Result<i128, AmountError> {
    let (whole, fraction) = split_decimal(input)?;
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals(decimals));
    }
    scale(whole, fraction, decimals)
}

/// A user-entered token or share amount: positive, at most 7 decimals.
pub fn parse_amount(input: &str) -> Result<i128, AmountError> {
    let value = parse_fixed(input, DECIMALS)?;
    if value <= 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(value)
}

/// Percent string to on-chain rate: `floor(p / 100 * 10^7)`.
///
/// Digits past the representable precision are dropped (floor).
pub fn percent_to_rate(input: &str) -> Result<i128, AmountError> {
    let (whole, fraction) = split_decimal(input)?;
    let kept = &fraction[..fraction.len().min(PERCENT_DECIMALS as usize)];
    let rate = scale(whole, kept, PERCENT_DECIMALS)?;
    if rate > 100 * 10i128.pow(PERCENT_DECIMALS) {
        return Err(AmountError::PercentOutOfRange);
    }
    Ok(rate)
}

/// On-chain rate back to a percent with one decimal, e.g. `"12.5"`.
pub fn format_percent(rate: i128) -> String {
    let per_tenth = 10i128.pow(PERCENT_DECIMALS - 1);
    let tenths = rate.saturating_add(per_tenth / 2).div_euclid(per_tenth);
    format!("{}.{}", tenths / 10, (tenths % 10).abs())
}

/// Largest power of ten that fits the unsigned magnitude of an `i128`.
const MAX_DECIMALS: u32 = 38;

/// Render a 7-decimal integer with `places` decimals, truncating.
pub fn format_amount(value: i128, places: u32) -> String {
    format_units(value, DECIMALS, places)
}

/// Render an integer with `decimals` implied places, showing `places`.
pub fn format_units(value: i128, decimals: u32, places: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let places = places.min(decimals);
    let scalar = 10u128.pow(decimals);
    let negative = value < 0;
    let abs = value.unsigned_abs();
    let whole = abs / scalar;
    let fraction = abs % scalar;
    let sign = if negative { "-" } else { "" };
    if places == 0 {
        return format!("{}{}", sign, whole);
    }
    let shown = fraction / 10u128.pow(decimals - places);
    format!(
        "{}{}.{:0width$}",
        sign,
        whole,
        shown,
        width = places as usize
    )
}

/// 7-decimal integer as a float, for ratios and display only.
pub fn to_decimal(value: i128) -> f64 {
    value as f64 / SCALAR_7 as f64
}
