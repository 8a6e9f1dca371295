//! Exact integer arithmetic over scaled reward accumulators.
//!
//! Every value that later takes part in a comparison or a subtraction
//! (accumulators, debts, claimable amounts) is an integer scaled by
//! [`PRECISION`]. Floating point never enters these helpers.

/// Scale of the per-share reward accumulator (`10^12`).
pub const PRECISION: u128 = 1_000_000_000_000;

/// Failure of a fixed-point operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Divisor was zero. Callers special-case an empty pool before dividing.
    #[error("division by zero")]
    DivisionByZero,

    /// Result does not fit in 128 bits.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

/// Exact product of two integers.
///
/// No truncation happens here; callers divide once, at the end.
///
/// # Errors
///
/// Returns [`MathError::ArithmeticOverflow`] if the product exceeds `u128`.
pub fn scaled_mul(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_mul(b).ok_or(MathError::ArithmeticOverflow)
}

/// Integer division truncating toward zero, as the on-chain program does.
///
/// # Errors
///
/// Returns [`MathError::DivisionByZero`] if `b == 0`.
pub fn scaled_div_trunc(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

/// Checked addition.
///
/// # Errors
///
/// Returns [`MathError::ArithmeticOverflow`] if the sum exceeds `u128`.
pub fn checked_add(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_add(b).ok_or(MathError::ArithmeticOverflow)
}

/// `a - b`, or `0` when `b` exceeds `a`.
///
/// Works over the full `u128` range: a debt above the accrued total is a
/// legitimate state and settles to nothing claimable.
#[must_use]
pub const fn clamp_non_negative(a: u128, b: u128) -> u128 {
    a.saturating_sub(b)
}

/// `a * b / c` with a single truncating division at the end.
///
/// # Errors
///
/// Propagates [`scaled_mul`] and [`scaled_div_trunc`] failures.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128, MathError> {
    scaled_div_trunc(scaled_mul(a, b)?, c)
}

/// Returns `10^decimals`.
///
/// # Errors
///
/// Returns [`MathError::ArithmeticOverflow`] for decimal counts beyond `u128`.
pub fn pow10(decimals: u8) -> Result<u128, MathError> {
    10u128
        .checked_pow(u32::from(decimals))
        .ok_or(MathError::ArithmeticOverflow)
}
