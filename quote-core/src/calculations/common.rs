//! Common utility functions for money calculations.
//!
//! This module provides shared functionality used by the pricing engine,
//! including rounding and summing of values that may be undefined.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to `digits` decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// the midpoint are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use quote_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454), 2), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(123.5), 0), dec!(124));
/// assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(
    value: Decimal,
    digits: u32,
) -> Decimal {
    value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums values, returning `None` if any value is undefined or the sum
/// overflows.
///
/// An empty input sums to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use quote_core::calculations::common::checked_sum;
///
/// assert_eq!(checked_sum([Some(dec!(1.5)), Some(dec!(2))]), Some(dec!(3.5)));
/// assert_eq!(checked_sum([Some(dec!(1.5)), None]), None);
/// ```
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value?))
}
