//! Quantities: a numeric value paired with a unit
//!
//! Values carry their representation: `Double` for fast f64 arithmetic,
//! `Exact` for decimal arithmetic routed through exact rationals. Mixing
//! the two promotes to the exact side.
//!
//! A quantity may also carry a kind resolved from the process-wide
//! registry. Derived results (products, quotients, powers, roots) look
//! their kind up by dimension; [`Quantity::as_kind`] relabels a quantity
//! to a compatible kind's natural unit without touching the value.

use std::fmt;
use std::sync::Arc;

use mensura_core::{
    decimal_from_f64, nth_root, Decimal, NumericError, PrecisionContext, Rational,
};

use crate::kind::{kind_for_dimension, kind_named, QuantityKind};
use crate::{Unit, UnitError};

/// The numeric value of a quantity
#[derive(Debug, Clone)]
pub enum Value {
    Double(f64),
    Exact(Decimal),
}

impl Value {
    pub fn is_exact(&self) -> bool {
        matches!(self, Value::Exact(_))
    }

    /// The value as an `f64`; exact values saturate outside the range
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Double(v) => *v,
            Value::Exact(d) => Rational::from_decimal(d).to_f64(),
        }
    }

    fn to_rational(&self) -> Rational {
        match self {
            Value::Double(v) => Rational::from_decimal(&decimal_from_f64(*v)),
            Value::Exact(d) => Rational::from_decimal(d),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Value::Double(v) => *v == 0.0,
            Value::Exact(d) => *d == Decimal::ZERO,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Exact(d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Double(v) => write!(f, "{v}"),
            Value::Exact(d) => write!(f, "{d}"),
        }
    }
}

/// An immutable value-with-unit
#[derive(Debug, Clone)]
pub struct Quantity {
    value: Value,
    unit: Unit,
    kind: Option<Arc<QuantityKind>>,
}

impl Quantity {
    /// A quantity with an `f64` value
    pub fn of(value: f64, unit: Unit) -> Self {
        Self::derive(Value::Double(value), unit)
    }

    /// A quantity with an exact decimal value
    pub fn exact(value: Decimal, unit: Unit) -> Self {
        Self::derive(Value::Exact(value), unit)
    }

    /// A quantity of a registered kind, expressed in the kind's natural
    /// unit. Fails when no kind carries that name.
    pub fn of_kind(value: f64, kind_name: &str) -> Result<Self, UnitError> {
        let kind = kind_named(kind_name)?;
        Ok(Quantity {
            value: Value::Double(value),
            unit: kind.unit().clone(),
            kind: Some(kind),
        })
    }

    /// Attach the kind the registry holds for this dimension, if any
    fn derive(value: Value, unit: Unit) -> Self {
        let kind = kind_for_dimension(&unit.dimension());
        Quantity { value, unit, kind }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn to_f64(&self) -> f64 {
        self.value.to_f64()
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn kind(&self) -> Option<&QuantityKind> {
        self.kind.as_deref()
    }

    // ========== Conversion ==========

    /// Express this quantity in another unit of the same measurement
    /// branch
    pub fn convert_to(&self, target: &Unit, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        let converter = self.unit.converter_to(target)?;
        let value = match &self.value {
            Value::Double(v) => Value::Double(converter.convert_f64(*v)),
            Value::Exact(d) => Value::Exact(converter.convert_exact(d, ctx)?),
        };
        Ok(Quantity {
            value,
            unit: target.clone(),
            kind: self.kind.clone(),
        })
    }

    /// Express this quantity in its system unit
    pub fn to_system(&self, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        self.convert_to(&self.unit.system_unit(), ctx)
    }

    /// Relabel this quantity under a named kind. The kind's dimension must
    /// match; the numeric value carries over to the kind's natural unit
    /// unchanged.
    pub fn as_kind(&self, kind_name: &str) -> Result<Self, UnitError> {
        let kind = kind_named(kind_name)?;
        if kind.dimension() != self.unit.dimension() {
            return Err(UnitError::Incommensurable {
                from: self.unit.symbol(),
                to: kind.unit().symbol(),
            });
        }
        Ok(Quantity {
            value: self.value.clone(),
            unit: kind.unit().clone(),
            kind: Some(kind),
        })
    }

    // ========== Arithmetic ==========

    /// Sum; the right operand converts into the left operand's unit
    pub fn add(&self, other: &Quantity, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        self.combine(other, ctx, |a, b| a + b, |a, b| Ok(a.add(b)))
    }

    /// Difference; the right operand converts into the left operand's unit
    pub fn sub(&self, other: &Quantity, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        self.combine(other, ctx, |a, b| a - b, |a, b| Ok(a.sub(b)))
    }

    fn combine(
        &self,
        other: &Quantity,
        ctx: &PrecisionContext,
        double_op: impl Fn(f64, f64) -> f64,
        exact_op: impl Fn(&Rational, &Rational) -> Result<Rational, NumericError>,
    ) -> Result<Self, UnitError> {
        let converter = other.unit.converter_to(&self.unit)?;
        let value = match (&self.value, &other.value) {
            (Value::Double(a), Value::Double(b)) => {
                Value::Double(double_op(*a, converter.convert_f64(*b)))
            }
            (a, b) => {
                let b_decimal = match b {
                    Value::Double(v) => decimal_from_f64(*v),
                    Value::Exact(d) => d.clone(),
                };
                let b_converted = converter.convert_exact(&b_decimal, ctx)?;
                let result = exact_op(&a.to_rational(), &Rational::from_decimal(&b_converted))?;
                Value::Exact(result.to_decimal(ctx))
            }
        };
        Ok(Quantity {
            value,
            unit: self.unit.clone(),
            kind: self.kind.clone(),
        })
    }

    /// Product; units multiply and the result's kind is looked up by its
    /// dimension
    pub fn multiply(&self, other: &Quantity, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        let unit = self.unit.multiply(&other.unit)?;
        let value = match (&self.value, &other.value) {
            (Value::Double(a), Value::Double(b)) => Value::Double(a * b),
            (a, b) => Value::Exact(a.to_rational().mul(&b.to_rational()).to_decimal(ctx)),
        };
        Ok(Self::derive(value, unit))
    }

    /// Quotient; fails on a zero divisor
    pub fn divide(&self, other: &Quantity, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        if other.value.is_zero() {
            return Err(NumericError::DivisionByZero.into());
        }
        let unit = self.unit.divide(&other.unit)?;
        let value = match (&self.value, &other.value) {
            (Value::Double(a), Value::Double(b)) => Value::Double(a / b),
            (a, b) => {
                let quotient = a.to_rational().checked_div(&b.to_rational())?;
                Value::Exact(quotient.to_decimal(ctx))
            }
        };
        Ok(Self::derive(value, unit))
    }

    /// Integer power of value and unit
    pub fn pow(&self, exponent: i32, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        let unit = self.unit.pow(exponent)?;
        let value = match &self.value {
            Value::Double(v) => Value::Double(v.powi(exponent)),
            Value::Exact(_) => {
                Value::Exact(self.value.to_rational().pow(exponent)?.to_decimal(ctx))
            }
        };
        Ok(Self::derive(value, unit))
    }

    /// The nth root of value and unit; fails for even roots of negative
    /// values
    pub fn nth_root(&self, degree: u32, ctx: &PrecisionContext) -> Result<Self, UnitError> {
        let unit = self.unit.nth_root(degree)?;
        let value = match &self.value {
            Value::Double(v) => Value::Double(f64_nth_root(*v, degree)?),
            Value::Exact(d) => Value::Exact(nth_root(degree, d, ctx)?),
        };
        Ok(Self::derive(value, unit))
    }
}

fn f64_nth_root(value: f64, degree: u32) -> Result<f64, NumericError> {
    if degree == 0 {
        return Err(NumericError::DomainError(
            "root degree must be positive".to_string(),
        ));
    }
    if value < 0.0 {
        if degree % 2 == 0 {
            return Err(NumericError::DomainError(format!(
                "even root of negative value {value}"
            )));
        }
        return Ok(-f64_nth_root(-value, degree)?);
    }
    Ok(match degree {
        1 => value,
        2 => value.sqrt(),
        3 => value.cbrt(),
        n => value.powf(1.0 / f64::from(n)),
    })
}

/// Quantities compare by their system-unit values; incommensurable
/// quantities are never equal.
impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        if self.unit.system_unit() != other.unit.system_unit() {
            return false;
        }
        let a = self.unit.to_system().convert_f64(self.to_f64());
        let b = other.unit.to_system().convert_f64(other.to_f64());
        a == b
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.unit.symbol();
        if symbol == "1" {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, symbol)
        }
    }
}
