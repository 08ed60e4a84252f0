//! Decimal precision and rounding contexts
//!
//! The exact evaluation path produces arbitrary-precision decimals. Every
//! operation that has to round takes an explicit [`PrecisionContext`] so the
//! caller, not the library, picks the digit count and the rounding rule.

use dashu_float::DBig;
use dashu_int::ops::BitTest;
use dashu_int::IBig;
use serde::{Deserialize, Serialize};

/// Arbitrary-precision decimal number (significand times a power of ten).
pub type Decimal = DBig;

/// Default significant-digit count for contexts created with `Default`.
pub const DEFAULT_DIGITS: usize = 50;

/// Rounding rule applied when a result is cut to a digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Round to nearest, ties to the even digit (banker's rounding)
    HalfEven,
    /// Round to nearest, ties away from zero
    HalfUp,
    /// Truncate toward zero
    Down,
    /// Round away from zero whenever digits are discarded
    Up,
    /// Round toward negative infinity
    Floor,
    /// Round toward positive infinity
    Ceiling,
}

/// Target precision for an exact-path evaluation: a significant-digit
/// count plus the rounding rule used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrecisionContext {
    /// Number of significant decimal digits in the result (at least 1)
    pub digits: usize,
    /// Rounding rule applied to the discarded tail
    pub rounding: Rounding,
}

impl PrecisionContext {
    /// Create a context with the given digit count and rounding rule
    pub fn new(digits: usize, rounding: Rounding) -> Self {
        Self {
            digits: digits.max(1),
            rounding,
        }
    }

    /// Context with the given digit count and half-even rounding
    pub fn with_digits(digits: usize) -> Self {
        Self::new(digits, Rounding::HalfEven)
    }

    /// Working precision used internally before the final rounding step
    pub(crate) fn working_digits(&self) -> usize {
        self.digits + 8
    }
}

impl Default for PrecisionContext {
    fn default() -> Self {
        Self::with_digits(DEFAULT_DIGITS)
    }
}

/// Convert a decimal to `f64` via its significand/exponent parts.
///
/// Returns `None` when the value is outside the `f64` range.
pub fn decimal_to_f64(value: &Decimal) -> Option<f64> {
    let (significand, exponent) = value.clone().into_repr().into_parts();

    let sig_f64: f64 = if significand.bit_len() <= 53 {
        let as_i64: i64 = significand.try_into().ok()?;
        as_i64 as f64
    } else {
        // Too wide for an exact mantissa: keep the top 53 bits and restore
        // the scale afterwards.
        let dropped = significand.bit_len() - 53;
        let top: i64 = (&significand >> dropped).try_into().ok()?;
        (top as f64) * 2_f64.powi(dropped as i32)
    };

    let result = if exponent == 0 {
        sig_f64
    } else if (1..=308).contains(&exponent) {
        sig_f64 * 10_f64.powi(exponent as i32)
    } else if (-323..0).contains(&exponent) {
        sig_f64 / 10_f64.powi((-exponent) as i32)
    } else {
        return None;
    };

    result.is_finite().then_some(result)
}

/// Parse an `f64` into an exact decimal through its shortest round-trip
/// text form. Non-finite inputs map to zero.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return DBig::ZERO;
    }
    format!("{value:e}").parse().unwrap_or(DBig::ZERO)
}

/// `10^exp` as an arbitrary-precision integer
pub(crate) fn pow10(exp: usize) -> IBig {
    IBig::from(10).pow(exp)
}

/// Number of decimal digits in `|n|` (zero has one digit)
pub(crate) fn digit_count(n: &IBig) -> usize {
    let s = n.to_string();
    s.len() - usize::from(s.starts_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_clamps_digits() {
        let ctx = PrecisionContext::new(0, Rounding::Down);
        assert_eq!(ctx.digits, 1);
    }

    #[test]
    fn test_decimal_to_f64_roundtrip() {
        let d: Decimal = "3.25".parse().unwrap();
        assert_eq!(decimal_to_f64(&d), Some(3.25));

        let neg: Decimal = "-1024".parse().unwrap();
        assert_eq!(decimal_to_f64(&neg), Some(-1024.0));
    }

    #[test]
    fn test_decimal_to_f64_wide_significand() {
        // More than 53 bits of significand still lands close
        let d: Decimal = "123456789012345678901234567890".parse().unwrap();
        let f = decimal_to_f64(&d).unwrap();
        assert!((f - 1.2345678901234568e29).abs() / 1e29 < 1e-12);
    }

    #[test]
    fn test_decimal_to_f64_overflow() {
        let d = Decimal::from_parts(dashu_int::IBig::from(1), 400);
        assert_eq!(decimal_to_f64(&d), None);
    }

    #[test]
    fn test_decimal_from_f64() {
        let d = decimal_from_f64(0.5);
        assert_eq!(decimal_to_f64(&d), Some(0.5));
        assert_eq!(decimal_from_f64(f64::NAN), DBig::ZERO);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(&IBig::from(0)), 1);
        assert_eq!(digit_count(&IBig::from(-1234)), 4);
        assert_eq!(digit_count(&pow10(10)), 11);
    }
}
