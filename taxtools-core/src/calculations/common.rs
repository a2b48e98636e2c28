//! Rounding and clamping shared by the calculators.
//!
//! All rounding is midpoint-away-from-zero and applied only when a figure is
//! presented; intermediate sums stay unrounded.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to `dp` decimal places, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxtools_core::calculations::common::round_half_away;
///
/// assert_eq!(round_half_away(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_away(dec!(6307.5), 0), dec!(6308));
/// assert_eq!(round_half_away(dec!(-0.5), 0), dec!(-1));
/// ```
pub fn round_half_away(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a currency amount to a whole unit.
pub fn round_whole(value: Decimal) -> Decimal {
    round_half_away(value, 0)
}

/// Expresses a fraction as a percentage rounded to two places.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxtools_core::calculations::common::to_percent;
///
/// assert_eq!(to_percent(dec!(0.22)), dec!(22.00));
/// assert_eq!(to_percent(dec!(0.126149)), dec!(12.61));
/// ```
pub fn to_percent(fraction: Decimal) -> Decimal {
    round_half_away(fraction * Decimal::ONE_HUNDRED, 2)
}

/// Clamps negative amounts to zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
