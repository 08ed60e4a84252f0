//! Dimensional analysis types
//!
//! Each physical quantity has dimensions represented as a 7-element vector
//! of rational exponents over the SI base dimensions:
//! [length, mass, time, current, temperature, amount, luminosity]
//!
//! Rational exponents keep `root` closed over the algebra (a square root of
//! an area is a length, a square root of a length is L^1/2).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UnitError;

/// Dimension indices for the 7 SI base quantities
pub const LENGTH: usize = 0;
pub const MASS: usize = 1;
pub const TIME: usize = 2;
pub const CURRENT: usize = 3;
pub const TEMPERATURE: usize = 4;
pub const AMOUNT: usize = 5;
pub const LUMINOSITY: usize = 6;

/// A reduced rational exponent (denominator always positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    num: i32,
    den: i32,
}

impl Fraction {
    /// Zero exponent
    pub const ZERO: Fraction = Fraction { num: 0, den: 1 };

    /// Unit exponent
    pub const ONE: Fraction = Fraction { num: 1, den: 1 };

    /// An integer exponent
    pub const fn int(n: i32) -> Self {
        Fraction { num: n, den: 1 }
    }

    /// A reduced `num/den` exponent; fails on a zero denominator
    pub fn new(num: i32, den: i32) -> Result<Self, UnitError> {
        if den == 0 {
            return Err(UnitError::InvalidArgument(
                "fraction denominator must be non-zero".to_string(),
            ));
        }
        Self::reduced(i64::from(num), i64::from(den), den)
    }

    fn reduced(num: i64, den: i64, reported: i32) -> Result<Self, UnitError> {
        let sign = if den < 0 { -1 } else { 1 };
        let (num, den) = (num * i64::from(sign), den * i64::from(sign));
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1);
        let num = num / g as i64;
        let den = den / g as i64;
        let num = i32::try_from(num).map_err(|_| UnitError::NonIntegralExponent(reported))?;
        let den = i32::try_from(den).map_err(|_| UnitError::NonIntegralExponent(reported))?;
        Ok(Fraction { num, den })
    }

    /// Numerator of the reduced form
    pub fn numerator(&self) -> i32 {
        self.num
    }

    /// Denominator of the reduced form (always positive)
    pub fn denominator(&self) -> i32 {
        self.den
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Check if an integer exponent
    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// The integer value when `is_integer`
    pub fn as_integer(&self) -> Option<i32> {
        self.is_integer().then_some(self.num)
    }

    pub(crate) fn add(&self, other: &Fraction) -> Result<Self, UnitError> {
        let num = i64::from(self.num) * i64::from(other.den) + i64::from(other.num) * i64::from(self.den);
        Self::reduced(num, i64::from(self.den) * i64::from(other.den), other.num)
    }

    pub(crate) fn sub(&self, other: &Fraction) -> Result<Self, UnitError> {
        self.add(&Fraction {
            num: -other.num,
            den: other.den,
        })
    }

    pub(crate) fn scale(&self, n: i32) -> Result<Self, UnitError> {
        Self::reduced(i64::from(self.num) * i64::from(n), i64::from(self.den), n)
    }

    pub(crate) fn div_int(&self, n: i32) -> Result<Self, UnitError> {
        if n == 0 {
            return Err(UnitError::InvalidArgument(
                "cannot divide an exponent by zero".to_string(),
            ));
        }
        Self::reduced(i64::from(self.num), i64::from(self.den) * i64::from(n), n)
    }

    pub(crate) fn mul(&self, other: &Fraction) -> Result<Self, UnitError> {
        Self::reduced(
            i64::from(self.num) * i64::from(other.num),
            i64::from(self.den) * i64::from(other.den),
            other.num,
        )
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Represents the dimensions of a physical quantity as rational exponents
/// of the 7 SI base dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    /// [length, mass, time, current, temperature, amount, luminosity]
    exponents: [Fraction; 7],
}

const fn base(index: usize) -> Dimension {
    let mut exponents = [Fraction::ZERO; 7];
    exponents[index] = Fraction::ONE;
    Dimension { exponents }
}

impl Dimension {
    /// Dimensionless quantity (all exponents zero)
    pub const DIMENSIONLESS: Dimension = Dimension {
        exponents: [Fraction::ZERO; 7],
    };

    /// Length dimension [L]
    pub const LENGTH: Dimension = base(LENGTH);

    /// Mass dimension [M]
    pub const MASS: Dimension = base(MASS);

    /// Time dimension [T]
    pub const TIME: Dimension = base(TIME);

    /// Electric current dimension [I]
    pub const CURRENT: Dimension = base(CURRENT);

    /// Temperature dimension [Θ]
    pub const TEMPERATURE: Dimension = base(TEMPERATURE);

    /// Amount of substance dimension [N]
    pub const AMOUNT: Dimension = base(AMOUNT);

    /// Luminous intensity dimension [J]
    pub const LUMINOSITY: Dimension = base(LUMINOSITY);

    /// Frequency [T^-1]
    pub const FREQUENCY: Dimension = Dimension {
        exponents: [
            Fraction::ZERO,
            Fraction::ZERO,
            Fraction::int(-1),
            Fraction::ZERO,
            Fraction::ZERO,
            Fraction::ZERO,
            Fraction::ZERO,
        ],
    };

    /// Force [M L T^-2]
    pub const FORCE: Dimension = Dimension {
        exponents: [
            Fraction::ONE,
            Fraction::ONE,
            Fraction::int(-2),
            Fraction::ZERO,
            Fraction::ZERO,
            Fraction::ZERO,
            Fraction::ZERO,
        ],
    };

    /// Create a dimension from integer exponents
    pub fn from_ints(exponents: [i32; 7]) -> Self {
        let mut result = [Fraction::ZERO; 7];
        for (slot, &e) in result.iter_mut().zip(exponents.iter()) {
            *slot = Fraction::int(e);
        }
        Dimension { exponents: result }
    }

    /// The exponent of one base dimension
    pub fn exponent(&self, index: usize) -> Fraction {
        self.exponents[index]
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(Fraction::is_zero)
    }

    /// Multiply dimensions (add exponents)
    pub fn multiply(&self, other: &Dimension) -> Result<Dimension, UnitError> {
        let mut result = [Fraction::ZERO; 7];
        for i in 0..7 {
            result[i] = self.exponents[i].add(&other.exponents[i])?;
        }
        Ok(Dimension { exponents: result })
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &Dimension) -> Result<Dimension, UnitError> {
        let mut result = [Fraction::ZERO; 7];
        for i in 0..7 {
            result[i] = self.exponents[i].sub(&other.exponents[i])?;
        }
        Ok(Dimension { exponents: result })
    }

    /// Raise to an integer power (multiply exponents)
    pub fn pow(&self, exp: i32) -> Result<Dimension, UnitError> {
        let mut result = [Fraction::ZERO; 7];
        for i in 0..7 {
            result[i] = self.exponents[i].scale(exp)?;
        }
        Ok(Dimension { exponents: result })
    }

    /// Take the nth root (divide exponents); n must be positive
    pub fn root(&self, n: i32) -> Result<Dimension, UnitError> {
        if n <= 0 {
            return Err(UnitError::InvalidArgument(
                "dimension root index must be positive".to_string(),
            ));
        }
        let mut result = [Fraction::ZERO; 7];
        for i in 0..7 {
            result[i] = self.exponents[i].div_int(n)?;
        }
        Ok(Dimension { exponents: result })
    }

    /// Raise to a rational power (used by product units)
    pub(crate) fn pow_fraction(&self, exp: &Fraction) -> Result<Dimension, UnitError> {
        let mut result = [Fraction::ZERO; 7];
        for i in 0..7 {
            result[i] = self.exponents[i].mul(exp)?;
        }
        Ok(Dimension { exponents: result })
    }

    /// Invert dimensions (negate exponents)
    pub fn invert(&self) -> Dimension {
        let mut result = [Fraction::ZERO; 7];
        for i in 0..7 {
            result[i] = Fraction {
                num: -self.exponents[i].num,
                den: self.exponents[i].den,
            };
        }
        Dimension { exponents: result }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = ["L", "M", "T", "I", "Θ", "N", "J"];
        let mut parts = Vec::new();

        for (i, exp) in self.exponents.iter().enumerate() {
            if exp.is_zero() {
                continue;
            }
            if *exp == Fraction::ONE {
                parts.push(names[i].to_string());
            } else {
                parts.push(format!("{}^{}", names[i], exp));
            }
        }

        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}
