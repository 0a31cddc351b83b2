//! Numeric helpers for turning formula results into integers.
//!
//! Formulas always produce `f64`. Weights, amounts, damage values and levels
//! are integers of a fixed width, so every conversion either saturates
//! ([`floor_integer`]) or is checked ([`narrow_i32`] and friends).

use crate::error::CalculationError;

/// Round half up: `floor(x + 0.5)`.
///
/// `2.5` rounds to `3` and `-2.5` rounds to `-2`.
///
/// # Examples
///
/// ```rust
/// use spawncalc::numeric::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3.0);
/// assert_eq!(round_half_up(-2.5), -2.0);
/// assert_eq!(round_half_up(-2.6), -3.0);
/// ```
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Floor `x` and saturate into the 32-bit range.
///
/// Values above `i32::MAX` map to `i32::MAX`, values below `i32::MIN` map to
/// `i32::MIN`. NaN maps to `0`.
///
/// # Examples
///
/// ```rust
/// use spawncalc::numeric::floor_integer;
///
/// assert_eq!(floor_integer(3.7), 3);
/// assert_eq!(floor_integer(-3.2), -4);
/// assert_eq!(floor_integer(1e30), i32::MAX);
/// assert_eq!(floor_integer(-1e30), i32::MIN);
/// ```
pub fn floor_integer(x: f64) -> i32 {
    // `as` saturates and maps NaN to zero
    x.floor() as i32
}

fn narrow<T>(value: f64, target: &'static str) -> Result<T, CalculationError>
where
    T: TryFrom<i64>,
{
    let overflow = || CalculationError::ArithmeticOverflow { value, target };
    let rounded = round_half_up(value);
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(overflow());
    }
    T::try_from(rounded as i64).map_err(|_| overflow())
}

/// Round and check into `i32`.
///
/// # Examples
///
/// ```rust
/// use spawncalc::numeric::narrow_i32;
///
/// assert_eq!(narrow_i32(41.5).unwrap(), 42);
/// assert!(narrow_i32(3e9).is_err());
/// ```
pub fn narrow_i32(value: f64) -> Result<i32, CalculationError> {
    narrow(value, "i32")
}

/// Round and check into `i16`.
pub fn narrow_i16(value: f64) -> Result<i16, CalculationError> {
    narrow(value, "i16")
}

/// Round and check into `i8`.
pub fn narrow_i8(value: f64) -> Result<i8, CalculationError> {
    narrow(value, "i8")
}
