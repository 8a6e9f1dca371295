//! Conversion between decimal token strings and integer base units.
//!
//! Both directions work on digits, never on floats, so large balances keep
//! every unit.

use crate::error::StakingError;

/// Decimal places used for token amounts in responses.
pub const AMOUNT_DISPLAY_PLACES: usize = 6;

/// Decimal places used for rates in responses.
pub const RATE_DISPLAY_PLACES: usize = 9;

/// Decimal places used for percentages in responses.
pub const PERCENT_DISPLAY_PLACES: usize = 8;

/// Parses a decimal string such as `"12.5"` into base units.
///
/// The whole part is scaled by `10^decimals`; fractional digits beyond
/// `decimals` are dropped, so the result never exceeds the requested
/// amount. A result of `0` is returned as-is; callers reject it where a
/// zero amount is meaningless.
///
/// # Errors
///
/// Returns [`StakingError::InvalidAmount`] when the string is empty, signed,
/// not a plain decimal, or larger than `u64::MAX` base units.
pub fn parse_decimal_amount(input: &str, decimals: u8) -> Result<u64, StakingError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StakingError::InvalidAmount("amount is empty".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(StakingError::InvalidAmount(format!(
            "amount must be positive: {trimmed}"
        )));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(StakingError::InvalidAmount(format!("malformed amount: {trimmed}")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(StakingError::InvalidAmount(format!("malformed amount: {trimmed}")));
    }

    let decimals = usize::from(decimals);
    let kept: String = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(decimals)
        .collect();
    let digits = format!("{whole}{kept}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }

    digits
        .parse::<u64>()
        .map_err(|_| StakingError::InvalidAmount(format!("amount too large: {trimmed}")))
}

/// Formats `raw` base units as a decimal string with exactly `places`
/// fractional digits. Extra precision is truncated, missing precision is
/// zero-padded.
#[must_use]
pub fn format_raw_amount(raw: u128, decimals: u8, places: usize) -> String {
    let decimals = usize::from(decimals);
    let digits = format!("{raw:0>width$}", width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);

    if places == 0 {
        return whole.to_string();
    }
    let fraction: String = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(places)
        .collect();
    format!("{whole}.{fraction}")
}

/// Formats a display-only float with `places` fractional digits.
#[must_use]
pub fn format_rate(value: f64, places: usize) -> String {
    if value.is_finite() {
        format!("{value:.places$}")
    } else {
        format!("{:.places$}", 0.0)
    }
}
