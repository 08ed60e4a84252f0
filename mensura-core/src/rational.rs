//! Exact rational arithmetic
//!
//! [`Rational`] is the scale type behind every linear unit converter: chains
//! of scalings multiply without accumulating rounding error, and the caller
//! decides when (and how) to round into a decimal or an `f64`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::decimal::{decimal_to_f64, digit_count, pow10, Decimal, PrecisionContext, Rounding};
use crate::NumericError;

/// Arbitrary-precision fraction, always stored reduced with the sign on
/// the numerator. Immutable; all operations return new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational {
    inner: RBig,
}

impl Rational {
    // ========== Construction ==========

    /// Create from a numerator/denominator pair. A zero denominator fails.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, NumericError> {
        if denominator == 0 {
            return Err(NumericError::DivisionByZero);
        }
        let mut num = IBig::from(numerator);
        if denominator < 0 {
            num = -num;
        }
        let den = UBig::from(denominator.unsigned_abs());
        Ok(Self {
            inner: RBig::from_parts(num, den),
        })
    }

    /// Create from arbitrary-precision parts. A zero denominator fails.
    pub fn from_bigints(numerator: IBig, denominator: IBig) -> Result<Self, NumericError> {
        if denominator == IBig::ZERO {
            return Err(NumericError::DivisionByZero);
        }
        let (num, den) = if denominator < IBig::ZERO {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        let den = UBig::try_from(den).map_err(|_| NumericError::DivisionByZero)?;
        Ok(Self {
            inner: RBig::from_parts(num, den),
        })
    }

    /// Create from an integer
    pub fn from_integer(n: i64) -> Self {
        Self {
            inner: RBig::from_parts(IBig::from(n), UBig::ONE),
        }
    }

    /// The exact value of a decimal (significand times a power of ten)
    pub fn from_decimal(value: &Decimal) -> Self {
        let (significand, exponent) = value.clone().into_repr().into_parts();
        let inner = if exponent >= 0 {
            RBig::from_parts(significand * pow10(exponent as usize), UBig::ONE)
        } else {
            let den = UBig::try_from(pow10((-exponent) as usize)).unwrap_or(UBig::ONE);
            RBig::from_parts(significand, den)
        };
        Self { inner }
    }

    /// Zero
    pub fn zero() -> Self {
        Self { inner: RBig::ZERO }
    }

    /// One
    pub fn one() -> Self {
        Self { inner: RBig::ONE }
    }

    // ========== Predicates ==========

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.inner == RBig::ZERO
    }

    /// Check if one
    pub fn is_one(&self) -> bool {
        self.inner == RBig::ONE
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.inner < RBig::ZERO
    }

    /// Check if the reduced denominator is one
    pub fn is_integer(&self) -> bool {
        let (_, den) = self.clone().into_parts();
        den == UBig::ONE
    }

    // ========== Arithmetic ==========

    /// Addition
    pub fn add(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner + &other.inner,
        }
    }

    /// Subtraction
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner - &other.inner,
        }
    }

    /// Multiplication
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            inner: &self.inner * &other.inner,
        }
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumericError> {
        if other.is_zero() {
            Err(NumericError::DivisionByZero)
        } else {
            Ok(Self {
                inner: &self.inner / &other.inner,
            })
        }
    }

    /// Negation
    pub fn neg(&self) -> Self {
        Self {
            inner: -self.inner.clone(),
        }
    }

    /// Multiplicative inverse; fails on zero
    pub fn invert(&self) -> Result<Self, NumericError> {
        if self.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        let (num, den) = self.clone().into_parts();
        Self::from_bigints(IBig::from(den), num)
    }

    /// Integer power; a negative exponent of zero fails
    pub fn pow(&self, exp: i32) -> Result<Self, NumericError> {
        if exp == 0 {
            return Ok(Self::one());
        }

        let mut result = Self::one();
        for _ in 0..exp.unsigned_abs() {
            result = result.mul(self);
        }

        if exp < 0 {
            result.invert()
        } else {
            Ok(result)
        }
    }

    // ========== Conversion ==========

    /// Reduced numerator and denominator
    pub fn into_parts(self) -> (IBig, UBig) {
        self.inner.into_parts()
    }

    /// Round to a decimal with the context's significant digits and
    /// rounding rule. The rounding decision is made exactly, in one step,
    /// over the true remainder.
    pub fn to_decimal(&self, ctx: &PrecisionContext) -> Decimal {
        let (num, den) = self.clone().into_parts();
        if num == IBig::ZERO {
            return Decimal::ZERO;
        }

        let negative = num < IBig::ZERO;
        let num_abs = if negative { -num } else { num };
        let den = IBig::from(den);

        // Scale so the integer quotient carries more digits than requested,
        // then cut the excess in a single rounding step.
        let shift = ctx.digits + digit_count(&den) + 2;
        let scaled = num_abs * pow10(shift);
        let quotient = &scaled / &den;
        let inexact = &scaled % &den != IBig::ZERO;

        let excess = digit_count(&quotient) - ctx.digits;
        let divisor = pow10(excess);
        let mut kept = &quotient / &divisor;
        let dropped = &quotient % &divisor;
        let sticky = inexact || dropped != IBig::ZERO;

        if round_up(&dropped, &divisor, inexact, &kept, negative, ctx.rounding, sticky) {
            kept += IBig::ONE;
        }

        let significand = if negative { -kept } else { kept };
        // Signed: integers wider than the digit budget have excess > shift.
        let exponent = excess as isize - shift as isize;
        Decimal::from_parts(significand, exponent)
    }

    /// Convert to f64 (may lose precision; saturates outside the range)
    pub fn to_f64(&self) -> f64 {
        let approx = self.to_decimal(&PrecisionContext::with_digits(19));
        match decimal_to_f64(&approx) {
            Some(f) => f,
            None if self.is_negative() => f64::NEG_INFINITY,
            None => f64::INFINITY,
        }
    }
}

/// Whether the discarded tail pushes the kept digits one step up in
/// magnitude. `dropped`/`divisor` are the local remainder pair, `inexact`
/// marks a non-zero remainder further right.
fn round_up(
    dropped: &IBig,
    divisor: &IBig,
    inexact: bool,
    kept: &IBig,
    negative: bool,
    rounding: Rounding,
    sticky: bool,
) -> bool {
    match rounding {
        Rounding::Down => false,
        Rounding::Up => sticky,
        Rounding::Floor => negative && sticky,
        Rounding::Ceiling => !negative && sticky,
        Rounding::HalfUp => dropped * IBig::from(2) >= *divisor,
        Rounding::HalfEven => {
            let twice = dropped * IBig::from(2);
            match twice.cmp(divisor) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => inexact || kept % IBig::from(2) != IBig::ZERO,
            }
        }
    }
}

// ========== Trait Implementations ==========

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (num, den) = self.clone().into_parts();
        if den == UBig::ONE {
            write!(f, "{num}")
        } else {
            write!(f, "{num}/{den}")
        }
    }
}

impl FromStr for Rational {
    type Err = NumericError;

    /// Parses `"p/q"`, plain integers, and decimal strings like `"273.15"`.
    fn from_str(s: &str) -> Result<Self, NumericError> {
        let s = s.trim();
        let parse_err = || NumericError::ParseError(s.to_string());

        if let Some((num_str, den_str)) = s.split_once('/') {
            let num: IBig = num_str.trim().parse().map_err(|_| parse_err())?;
            let den: IBig = den_str.trim().parse().map_err(|_| parse_err())?;
            return Self::from_bigints(num, den);
        }

        if let Some((int_str, frac_str)) = s.split_once('.') {
            if frac_str.is_empty() || !frac_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(parse_err());
            }
            let digits: IBig = format!("{int_str}{frac_str}").parse().map_err(|_| parse_err())?;
            return Self::from_bigints(digits, pow10(frac_str.len()));
        }

        let num: IBig = s.parse().map_err(|_| parse_err())?;
        Self::from_bigints(num, IBig::ONE)
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
