//! Composable value transformations between a unit and its system unit
//!
//! A converter is a closed set of variants: identity, exact rational scale,
//! exact additive shift, composition, nth root, and integer power. Every
//! variant evaluates on two paths that must agree: a cheap `f64` path with
//! cached multipliers, and an exact decimal path driven by a caller-supplied
//! [`PrecisionContext`].
//!
//! Composition simplifies algebraically: identities vanish, scale chains
//! fuse into a single scale, shift chains fuse into a single shift, so
//! converter trees do not grow with repeated derivation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

use mensura_core::{nth_root, Decimal, PrecisionContext, Rational};

use crate::UnitError;

/// A numeric transformation from a unit's values to its system unit's
/// values. Immutable; composition returns new converters.
#[derive(Debug, Clone)]
pub struct UnitConverter {
    kind: Kind,
}

#[derive(Debug, Clone)]
enum Kind {
    Identity,
    Scale {
        factor: Rational,
        multiplier: f64,
    },
    Shift {
        offset: Rational,
        offset_f64: f64,
    },
    Compose {
        first: Arc<UnitConverter>,
        second: Arc<UnitConverter>,
    },
    Root {
        inner: Arc<UnitConverter>,
        degree: u32,
        rooted: f64,
    },
    Power {
        inner: Arc<UnitConverter>,
        exponent: i32,
        multiplier: f64,
    },
}

impl UnitConverter {
    // ========== Construction ==========

    /// The identity transformation
    pub fn identity() -> Self {
        Self {
            kind: Kind::Identity,
        }
    }

    /// Multiplication by an exact rational factor; a zero factor fails
    pub fn scale(factor: Rational) -> Result<Self, UnitError> {
        if factor.is_zero() {
            return Err(UnitError::InvalidArgument(
                "scale factor must be non-zero".to_string(),
            ));
        }
        Ok(Self::new_scale(factor))
    }

    /// Multiplication by the exact fraction `num/den`
    pub fn scale_of(num: i64, den: i64) -> Result<Self, UnitError> {
        let factor = Rational::new(num, den).map_err(UnitError::from)?;
        Self::scale(factor)
    }

    /// Addition of an exact offset
    pub fn shift(offset: Rational) -> Self {
        if offset.is_zero() {
            return Self::identity();
        }
        let offset_f64 = offset.to_f64();
        Self {
            kind: Kind::Shift { offset, offset_f64 },
        }
    }

    /// The `degree`-th root of a linear converter. Fails on a zero degree
    /// and on a non-linear inner converter.
    pub fn root(inner: UnitConverter, degree: u32) -> Result<Self, UnitError> {
        if degree == 0 {
            return Err(UnitError::InvalidArgument(
                "root degree must be positive".to_string(),
            ));
        }
        if !inner.is_linear() {
            return Err(UnitError::InvalidArgument(
                "cannot take the root of a non-linear converter".to_string(),
            ));
        }
        if degree == 1 {
            return Ok(inner);
        }
        Ok(Self::root_unchecked(inner, degree))
    }

    /// Integer power of a linear converter. Fails on a non-linear inner
    /// converter.
    pub fn power(inner: UnitConverter, exponent: i32) -> Result<Self, UnitError> {
        if !inner.is_linear() {
            return Err(UnitError::InvalidArgument(
                "cannot raise a non-linear converter to a power".to_string(),
            ));
        }
        Ok(Self::power_unchecked(inner, exponent))
    }

    fn new_scale(factor: Rational) -> Self {
        if factor.is_one() {
            return Self::identity();
        }
        let multiplier = factor.to_f64();
        Self {
            kind: Kind::Scale { factor, multiplier },
        }
    }

    /// Root over an inner converter already known to be linear
    fn root_unchecked(inner: UnitConverter, degree: u32) -> Self {
        let rooted = f64_root(inner.scale_f64().unwrap_or(f64::NAN), degree);
        Self {
            kind: Kind::Root {
                inner: Arc::new(inner),
                degree,
                rooted,
            },
        }
    }

    /// Power over an inner converter already known to be linear
    fn power_unchecked(inner: UnitConverter, exponent: i32) -> Self {
        match exponent {
            0 => Self::identity(),
            1 => inner,
            _ => {
                let multiplier = inner.scale_f64().unwrap_or(f64::NAN).powi(exponent);
                Self {
                    kind: Kind::Power {
                        inner: Arc::new(inner),
                        exponent,
                        multiplier,
                    },
                }
            }
        }
    }

    // ========== Contract ==========

    /// Whether the transformation is `x -> x * k` for some constant `k`
    pub fn is_linear(&self) -> bool {
        match &self.kind {
            Kind::Identity | Kind::Scale { .. } | Kind::Root { .. } | Kind::Power { .. } => true,
            Kind::Shift { .. } => false,
            Kind::Compose { first, second } => first.is_linear() && second.is_linear(),
        }
    }

    /// Whether this is the identity transformation
    pub fn is_identity(&self) -> bool {
        matches!(self.kind, Kind::Identity)
    }

    /// Fast floating-point evaluation
    pub fn convert_f64(&self, x: f64) -> f64 {
        match &self.kind {
            Kind::Identity => x,
            Kind::Scale { multiplier, .. } => x * multiplier,
            Kind::Shift { offset_f64, .. } => x + offset_f64,
            Kind::Compose { first, second } => second.convert_f64(first.convert_f64(x)),
            Kind::Root { rooted, .. } => x * rooted,
            Kind::Power { multiplier, .. } => x * multiplier,
        }
    }

    /// Exact evaluation, rounded per the supplied context
    pub fn convert_exact(&self, x: &Decimal, ctx: &PrecisionContext) -> Result<Decimal, UnitError> {
        match &self.kind {
            Kind::Identity => Ok(x.clone()),
            Kind::Scale { factor, .. } => {
                Ok(Rational::from_decimal(x).mul(factor).to_decimal(ctx))
            }
            Kind::Shift { offset, .. } => {
                Ok(Rational::from_decimal(x).add(offset).to_decimal(ctx))
            }
            Kind::Compose { first, second } => {
                second.convert_exact(&first.convert_exact(x, ctx)?, ctx)
            }
            Kind::Root { .. } | Kind::Power { .. } => {
                // Fresh per call: the target precision is caller-supplied.
                let multiplier = self.scale_exact(ctx)?;
                Ok((x * &multiplier).with_precision(ctx.digits).value())
            }
        }
    }

    /// The inverse transformation
    pub fn inverse(&self) -> UnitConverter {
        match &self.kind {
            Kind::Identity => Self::identity(),
            Kind::Scale { factor, .. } => match factor.invert() {
                Ok(inverted) => Self::new_scale(inverted),
                // zero factors are rejected at construction
                Err(_) => Self::identity(),
            },
            Kind::Shift { offset, .. } => Self::shift(offset.neg()),
            Kind::Compose { first, second } => second.inverse().and_then(&first.inverse()),
            Kind::Root { inner, degree, .. } => Self::root_unchecked(inner.inverse(), *degree),
            Kind::Power {
                inner, exponent, ..
            } => Self::power_unchecked(inner.inverse(), *exponent),
        }
    }

    /// Apply `self` first, then `other`, fusing where the algebra allows
    pub fn and_then(&self, other: &UnitConverter) -> UnitConverter {
        match (&self.kind, &other.kind) {
            (Kind::Identity, _) => other.clone(),
            (_, Kind::Identity) => self.clone(),
            (Kind::Scale { factor: a, .. }, Kind::Scale { factor: b, .. }) => {
                Self::new_scale(a.mul(b))
            }
            (Kind::Shift { offset: a, .. }, Kind::Shift { offset: b, .. }) => {
                Self::shift(a.add(b))
            }
            _ => Self {
                kind: Kind::Compose {
                    first: Arc::new(self.clone()),
                    second: Arc::new(other.clone()),
                },
            },
        }
    }

    /// Apply `other` first, then `self`
    pub fn compose(&self, other: &UnitConverter) -> UnitConverter {
        other.and_then(self)
    }

    // ========== Linear-only accessors ==========

    /// The multiplier of a linear converter as `f64`; equals
    /// `convert_f64(1.0)`. Fails on non-linear converters.
    pub fn scale_f64(&self) -> Result<f64, UnitError> {
        match &self.kind {
            Kind::Identity => Ok(1.0),
            Kind::Scale { multiplier, .. } => Ok(*multiplier),
            Kind::Shift { .. } => Err(UnitError::NonLinearConverter),
            Kind::Compose { first, second } => Ok(first.scale_f64()? * second.scale_f64()?),
            Kind::Root { rooted, .. } => Ok(*rooted),
            Kind::Power { multiplier, .. } => Ok(*multiplier),
        }
    }

    /// The multiplier of a linear converter as an exact rational. Fails on
    /// non-linear converters and on root converters, whose multiplier is
    /// irrational.
    pub fn scale_rational(&self) -> Result<Rational, UnitError> {
        match &self.kind {
            Kind::Identity => Ok(Rational::one()),
            Kind::Scale { factor, .. } => Ok(factor.clone()),
            Kind::Shift { .. } => Err(UnitError::NonLinearConverter),
            Kind::Compose { first, second } => {
                Ok(first.scale_rational()?.mul(&second.scale_rational()?))
            }
            Kind::Root { .. } => Err(UnitError::InvalidArgument(
                "root converter multiplier is irrational".to_string(),
            )),
            Kind::Power {
                inner, exponent, ..
            } => Ok(inner.scale_rational()?.pow(*exponent)?),
        }
    }

    /// The multiplier of a linear converter as a decimal at the context's
    /// precision. Fails on non-linear converters.
    pub fn scale_exact(&self, ctx: &PrecisionContext) -> Result<Decimal, UnitError> {
        match &self.kind {
            Kind::Identity => Ok(Decimal::ONE),
            Kind::Scale { factor, .. } => Ok(factor.to_decimal(ctx)),
            Kind::Shift { .. } => Err(UnitError::NonLinearConverter),
            Kind::Compose { first, second } => {
                let product = first.scale_exact(ctx)? * second.scale_exact(ctx)?;
                Ok(product.with_precision(ctx.digits).value())
            }
            Kind::Root { inner, degree, .. } => {
                let inner_scale = inner.scale_exact(ctx)?;
                Ok(nth_root(*degree, &inner_scale, ctx)?)
            }
            Kind::Power {
                inner, exponent, ..
            } => {
                let base = inner.scale_exact(ctx)?;
                Ok(pow_decimal(&base, *exponent, ctx)?)
            }
        }
    }

    // ========== Structural accessors (formatting layer) ==========

    /// The rational factor of a plain scale converter
    pub fn as_scale(&self) -> Option<&Rational> {
        match &self.kind {
            Kind::Scale { factor, .. } => Some(factor),
            _ => None,
        }
    }

    /// The exact offset of a plain shift converter
    pub fn as_shift(&self) -> Option<&Rational> {
        match &self.kind {
            Kind::Shift { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

/// `sign(s) * |s|^(1/degree)`, NaN for even roots of negatives
fn f64_root(s: f64, degree: u32) -> f64 {
    if degree == 2 {
        return s.sqrt();
    }
    if s >= 0.0 {
        s.powf(1.0 / f64::from(degree))
    } else if degree % 2 == 1 {
        -((-s).powf(1.0 / f64::from(degree)))
    } else {
        f64::NAN
    }
}

/// Integer decimal power at context precision; negative exponents invert
fn pow_decimal(base: &Decimal, exponent: i32, ctx: &PrecisionContext) -> Result<Decimal, UnitError> {
    let mut result = Decimal::ONE.with_precision(ctx.digits).value();
    for _ in 0..exponent.unsigned_abs() {
        result = &result * base;
    }
    result = result.with_precision(ctx.digits).value();
    if exponent < 0 {
        if result == Decimal::ZERO {
            return Err(UnitError::from(mensura_core::NumericError::DivisionByZero));
        }
        result = (Decimal::ONE.with_precision(ctx.digits).value() / result)
            .with_precision(ctx.digits)
            .value();
    }
    Ok(result)
}

// Structural equality; cached f64 multipliers are derived data and do not
// participate.
impl PartialEq for UnitConverter {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (Kind::Identity, Kind::Identity) => true,
            (Kind::Scale { factor: a, .. }, Kind::Scale { factor: b, .. }) => a == b,
            (Kind::Shift { offset: a, .. }, Kind::Shift { offset: b, .. }) => a == b,
            (
                Kind::Compose {
                    first: f1,
                    second: s1,
                },
                Kind::Compose {
                    first: f2,
                    second: s2,
                },
            ) => f1 == f2 && s1 == s2,
            (
                Kind::Root {
                    inner: i1,
                    degree: d1,
                    ..
                },
                Kind::Root {
                    inner: i2,
                    degree: d2,
                    ..
                },
            ) => d1 == d2 && i1 == i2,
            (
                Kind::Power {
                    inner: i1,
                    exponent: e1,
                    ..
                },
                Kind::Power {
                    inner: i2,
                    exponent: e2,
                    ..
                },
            ) => e1 == e2 && i1 == i2,
            _ => false,
        }
    }
}

impl Eq for UnitConverter {}

impl Hash for UnitConverter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(&self.kind).hash(state);
        match &self.kind {
            Kind::Identity => {}
            Kind::Scale { factor, .. } => factor.hash(state),
            Kind::Shift { offset, .. } => offset.hash(state),
            Kind::Compose { first, second } => {
                first.hash(state);
                second.hash(state);
            }
            Kind::Root { inner, degree, .. } => {
                inner.hash(state);
                degree.hash(state);
            }
            Kind::Power {
                inner, exponent, ..
            } => {
                inner.hash(state);
                exponent.hash(state);
            }
        }
    }
}

impl fmt::Display for UnitConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Identity => write!(f, "x"),
            Kind::Scale { factor, .. } => write!(f, "x*{factor}"),
            Kind::Shift { offset, .. } => {
                if offset.is_negative() {
                    write!(f, "x{offset}")
                } else {
                    write!(f, "x+{offset}")
                }
            }
            Kind::Compose { first, second } => write!(f, "{second}∘{first}"),
            Kind::Root { inner, degree, .. } => write!(f, "({inner})^(1/{degree})"),
            Kind::Power {
                inner, exponent, ..
            } => write!(f, "({inner})^{exponent}"),
        }
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensura_core::{decimal_to_f64, Rounding};

    fn rat(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    fn kilo() -> UnitConverter {
        UnitConverter::scale_of(1000, 1).unwrap()
    }

    #[test]
    fn test_identity_composition_returns_operand() {
        let id = UnitConverter::identity();
        assert_eq!(id.and_then(&kilo()), kilo());
        assert_eq!(kilo().and_then(&id), kilo());
        assert_eq!(id.convert_f64(3.5), 3.5);
    }

    #[test]
    fn test_scale_fusion() {
        // Scale(1000) then Scale(2) fuses to a single Scale(2000)
        let fused = kilo().and_then(&UnitConverter::scale_of(2, 1).unwrap());
        assert_eq!(fused, UnitConverter::scale_of(2000, 1).unwrap());
        assert_eq!(fused.convert_f64(1.0), 2000.0);
    }

    #[test]
    fn test_shift_fusion() {
        let a = UnitConverter::shift(rat(5, 2));
        let b = UnitConverter::shift(rat(1, 2));
        assert_eq!(a.and_then(&b), UnitConverter::shift(rat(3, 1)));
    }

    #[test]
    fn test_scale_canonicalizes_one() {
        assert!(UnitConverter::scale(Rational::one()).unwrap().is_identity());
        assert!(UnitConverter::shift(Rational::zero()).is_identity());
        assert!(UnitConverter::scale(Rational::zero()).is_err());
    }

    #[test]
    fn test_linear_scale_equals_convert_one() {
        let converters = [
            UnitConverter::identity(),
            kilo(),
            UnitConverter::scale_of(5, 9).unwrap(),
            UnitConverter::root(kilo(), 2).unwrap(),
            UnitConverter::power(kilo(), 2).unwrap(),
            kilo().and_then(&UnitConverter::root(kilo(), 3).unwrap()),
        ];
        for c in &converters {
            assert!(c.is_linear());
            let scale = c.scale_f64().unwrap();
            assert!(
                (scale - c.convert_f64(1.0)).abs() <= scale.abs() * 1e-12,
                "scale/convert disagree for {c}"
            );
        }
    }

    #[test]
    fn test_shift_is_affine_not_linear() {
        let c = UnitConverter::shift(rat(27315, 100));
        assert!(!c.is_linear());
        assert_eq!(c.scale_f64(), Err(UnitError::NonLinearConverter));
        assert_eq!(c.scale_rational(), Err(UnitError::NonLinearConverter));
        assert!((c.convert_f64(1.0) - 274.15).abs() < 1e-12);
    }

    #[test]
    fn test_compose_linear_iff_both_linear() {
        let affine = UnitConverter::shift(rat(32, 1)).and_then(&kilo());
        assert!(!affine.is_linear());
        let linear = kilo().and_then(&UnitConverter::root(kilo(), 2).unwrap());
        assert!(linear.is_linear());
    }

    #[test]
    fn test_inverse_roundtrip() {
        let ctx = PrecisionContext::default();
        let converters = [
            kilo(),
            UnitConverter::shift(rat(-4567, 100)),
            UnitConverter::shift(rat(45967, 100)).and_then(&UnitConverter::scale_of(5, 9).unwrap()),
            UnitConverter::root(kilo(), 2).unwrap(),
            UnitConverter::power(UnitConverter::scale_of(3, 2).unwrap(), 3).unwrap(),
        ];
        for c in &converters {
            let roundtrip = c.and_then(&c.inverse());
            for x in [0.0, 1.0, -2.5, 1234.5] {
                assert!(
                    (roundtrip.convert_f64(x) - x).abs() < 1e-9,
                    "inverse round-trip failed for {c} at {x}"
                );
            }
            // double inverse behaves like the original
            let twice = c.inverse().inverse();
            assert!((twice.convert_f64(7.25) - c.convert_f64(7.25)).abs() < 1e-9);
            let probe: Decimal = "7.25".parse().unwrap();
            let exact = c.convert_exact(&probe, &ctx).unwrap();
            let exact_twice = twice.convert_exact(&probe, &ctx).unwrap();
            assert_eq!(exact, exact_twice);
        }
    }

    #[test]
    fn test_compose_applies_in_order() {
        let c1 = UnitConverter::shift(rat(1, 1));
        let c2 = kilo();
        // and_then: first shift, then scale
        assert_eq!(c1.and_then(&c2).convert_f64(2.0), 3000.0);
        // compose: scale first, then shift
        assert_eq!(c1.compose(&c2).convert_f64(2.0), 2001.0);
        for x in [0.5, 10.0, -3.0] {
            assert_eq!(
                c1.and_then(&c2).convert_f64(x),
                c2.convert_f64(c1.convert_f64(x))
            );
        }
    }

    #[test]
    fn test_root_requires_linear_and_positive_degree() {
        let shift = UnitConverter::shift(rat(1, 1));
        assert!(matches!(
            UnitConverter::root(shift.clone(), 2),
            Err(UnitError::InvalidArgument(_))
        ));
        assert!(matches!(
            UnitConverter::root(kilo(), 0),
            Err(UnitError::InvalidArgument(_))
        ));
        assert!(matches!(
            UnitConverter::power(shift, 2),
            Err(UnitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_root_degree_one_is_inner() {
        assert_eq!(UnitConverter::root(kilo(), 1).unwrap(), kilo());
        assert_eq!(UnitConverter::power(kilo(), 1).unwrap(), kilo());
        assert!(UnitConverter::power(kilo(), 0).unwrap().is_identity());
    }

    #[test]
    fn test_root_of_thousand() {
        let c = UnitConverter::root(kilo(), 2).unwrap();
        assert!((c.convert_f64(1.0) - 31.6227766).abs() < 1e-6);

        // the exact path agrees with the float path at the same precision
        let ctx = PrecisionContext::new(12, Rounding::HalfEven);
        let exact = c.convert_exact(&Decimal::ONE, &ctx).unwrap();
        let f = decimal_to_f64(&exact).unwrap();
        assert!((f - c.convert_f64(1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_power_scale() {
        let c = UnitConverter::power(kilo(), 2).unwrap();
        assert_eq!(c.convert_f64(1.0), 1e6);
        assert_eq!(c.scale_rational().unwrap(), rat(1_000_000, 1));

        let inv = UnitConverter::power(kilo(), -1).unwrap();
        assert_eq!(inv.scale_rational().unwrap(), rat(1, 1000));
    }

    #[test]
    fn test_convert_exact_scale_and_shift() {
        let ctx = PrecisionContext::default();
        let c = UnitConverter::scale_of(5, 9).unwrap();
        let x: Decimal = "18".parse().unwrap();
        assert_eq!(c.convert_exact(&x, &ctx).unwrap().to_string(), "10");

        let s = UnitConverter::shift(rat(27315, 100));
        let x: Decimal = "25".parse().unwrap();
        assert_eq!(s.convert_exact(&x, &ctx).unwrap().to_string(), "298.15");
    }

    #[test]
    fn test_exact_kilometre_is_exactly_thousand() {
        // 1 km = 1000 m with no rounding error on the exact path
        let ctx = PrecisionContext::default();
        let result = kilo().convert_exact(&Decimal::ONE, &ctx).unwrap();
        assert_eq!(result.to_string(), "1000");
    }

    #[test]
    fn test_structural_equality_and_hashing() {
        use std::collections::HashMap;

        let a = UnitConverter::root(kilo(), 2).unwrap();
        let b = UnitConverter::root(kilo(), 2).unwrap();
        assert_eq!(a, b);

        let mut cache: HashMap<UnitConverter, &str> = HashMap::new();
        cache.insert(a, "sqrt-kilo");
        assert_eq!(cache.get(&b), Some(&"sqrt-kilo"));

        let chain1 = UnitConverter::shift(rat(1, 2)).and_then(&kilo());
        let chain2 = UnitConverter::shift(rat(2, 4)).and_then(&kilo());
        assert_eq!(chain1, chain2);
        assert_ne!(chain1, kilo());
    }

    #[test]
    fn test_scale_rational_refused_for_root() {
        let c = UnitConverter::root(kilo(), 2).unwrap();
        assert!(matches!(
            c.scale_rational(),
            Err(UnitError::InvalidArgument(_))
        ));
        // the decimal accessor still works
        let ctx = PrecisionContext::with_digits(15);
        assert!(c.scale_exact(&ctx).is_ok());
    }
}
