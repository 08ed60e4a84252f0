//! Unit representation
//!
//! A unit ties a [`Dimension`] to a [`UnitConverter`] reaching its *system
//! unit*, the canonical representative of its measurement branch. Base and
//! alternate units are their own system units; transformed units share their
//! parent's; product units combine their components'.
//!
//! Convertibility is gated on shared system-unit identity, not on dimension
//! equality: hertz and becquerel are compatible (both T^-1) yet deliberately
//! not convertible, because the catalog assigns them distinct alternate
//! system units.

use std::fmt;
use std::sync::Arc;

use mensura_core::Rational;

use crate::dimension::Fraction;
use crate::{Dimension, UnitConverter, UnitError};

/// A unit of measurement. Cheap to clone (shared structure), immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    inner: Arc<UnitKind>,
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum UnitKind {
    /// Fundamental unit of one base dimension; its own system unit
    Base {
        symbol: String,
        name: Option<String>,
        dimension: Dimension,
    },
    /// A new, distinct system-unit identity over an existing system unit
    Alternate {
        symbol: String,
        name: Option<String>,
        parent: Unit,
    },
    /// A unit derived from a parent through a converter
    Transformed {
        symbol: Option<String>,
        name: Option<String>,
        parent: Unit,
        converter: UnitConverter,
    },
    /// A combination of units raised to rational exponents
    Product {
        components: Vec<(Unit, Fraction)>,
        dimension: Dimension,
        converter: UnitConverter,
    },
}

impl Unit {
    // ========== Construction ==========

    /// A base unit of the given dimension
    pub fn base(symbol: impl Into<String>, dimension: Dimension) -> Unit {
        Unit::from_kind(UnitKind::Base {
            symbol: symbol.into(),
            name: None,
            dimension,
        })
    }

    /// The dimensionless unit one (the empty product)
    pub fn one() -> Unit {
        Unit::from_kind(UnitKind::Product {
            components: Vec::new(),
            dimension: Dimension::DIMENSIONLESS,
            converter: UnitConverter::identity(),
        })
    }

    /// A new system-unit identity sharing this unit's dimension.
    ///
    /// The receiver must itself be a system unit; the result is compatible
    /// with it but not convertible to it.
    pub fn alternate(&self, symbol: impl Into<String>) -> Result<Unit, UnitError> {
        if !self.is_system_unit() {
            return Err(UnitError::InvalidArgument(
                "alternate units can only be declared over system units".to_string(),
            ));
        }
        Ok(Unit::from_kind(UnitKind::Alternate {
            symbol: symbol.into(),
            name: None,
            parent: self.clone(),
        }))
    }

    /// A unit whose values map into this unit through `converter`.
    ///
    /// An identity converter returns the receiver itself; transforms of
    /// transforms flatten into a single node over the original parent.
    pub fn transform(&self, converter: UnitConverter) -> Unit {
        if converter.is_identity() {
            return self.clone();
        }
        if let UnitKind::Transformed {
            parent,
            converter: existing,
            ..
        } = &*self.inner
        {
            let fused = converter.and_then(existing);
            if fused.is_identity() {
                return parent.clone();
            }
            return Unit::from_kind(UnitKind::Transformed {
                symbol: None,
                name: None,
                parent: parent.clone(),
                converter: fused,
            });
        }
        Unit::from_kind(UnitKind::Transformed {
            symbol: None,
            name: None,
            parent: self.clone(),
            converter,
        })
    }

    /// Prefix this unit (kilo, milli, ...). Prefixes compose: prefixing an
    /// already-prefixed unit accumulates the scales.
    pub fn with_prefix(&self, prefix: &Prefix) -> Unit {
        // zero factors are rejected at Prefix construction
        let scale = UnitConverter::scale(prefix.factor().clone())
            .unwrap_or_else(|_| UnitConverter::identity());
        let symbol = format!("{}{}", prefix.symbol(), self.symbol());
        self.transform(scale).with_symbol(symbol)
    }

    /// Override the symbol without altering dimension, converter, or
    /// system unit
    pub fn with_symbol(&self, symbol: impl Into<String>) -> Unit {
        let symbol = symbol.into();
        let kind = match &*self.inner {
            UnitKind::Base {
                name, dimension, ..
            } => UnitKind::Base {
                symbol,
                name: name.clone(),
                dimension: *dimension,
            },
            UnitKind::Alternate { name, parent, .. } => UnitKind::Alternate {
                symbol,
                name: name.clone(),
                parent: parent.clone(),
            },
            UnitKind::Transformed {
                name,
                parent,
                converter,
                ..
            } => UnitKind::Transformed {
                symbol: Some(symbol),
                name: name.clone(),
                parent: parent.clone(),
                converter: converter.clone(),
            },
            // labeled view over the product; same system unit, identity map
            UnitKind::Product { .. } => UnitKind::Transformed {
                symbol: Some(symbol),
                name: None,
                parent: self.clone(),
                converter: UnitConverter::identity(),
            },
        };
        Unit::from_kind(kind)
    }

    /// Override the descriptive name
    pub fn with_name(&self, name: impl Into<String>) -> Unit {
        let name = Some(name.into());
        let kind = match &*self.inner {
            UnitKind::Base {
                symbol, dimension, ..
            } => UnitKind::Base {
                symbol: symbol.clone(),
                name,
                dimension: *dimension,
            },
            UnitKind::Alternate { symbol, parent, .. } => UnitKind::Alternate {
                symbol: symbol.clone(),
                name,
                parent: parent.clone(),
            },
            UnitKind::Transformed {
                symbol,
                parent,
                converter,
                ..
            } => UnitKind::Transformed {
                symbol: symbol.clone(),
                name,
                parent: parent.clone(),
                converter: converter.clone(),
            },
            UnitKind::Product { .. } => UnitKind::Transformed {
                symbol: None,
                name,
                parent: self.clone(),
                converter: UnitConverter::identity(),
            },
        };
        Unit::from_kind(kind)
    }

    fn from_kind(kind: UnitKind) -> Unit {
        Unit {
            inner: Arc::new(kind),
        }
    }

    // ========== Accessors ==========

    /// The dimensional signature
    pub fn dimension(&self) -> Dimension {
        match &*self.inner {
            UnitKind::Base { dimension, .. } => *dimension,
            UnitKind::Alternate { parent, .. } => parent.dimension(),
            UnitKind::Transformed { parent, .. } => parent.dimension(),
            UnitKind::Product { dimension, .. } => *dimension,
        }
    }

    /// The unit symbol; derived descriptively when not explicitly set
    pub fn symbol(&self) -> String {
        match &*self.inner {
            UnitKind::Base { symbol, .. } | UnitKind::Alternate { symbol, .. } => symbol.clone(),
            UnitKind::Transformed {
                symbol,
                parent,
                converter,
                ..
            } => match symbol {
                Some(s) => s.clone(),
                None => derived_symbol(parent, converter),
            },
            UnitKind::Product { components, .. } => {
                if components.is_empty() {
                    return "1".to_string();
                }
                components
                    .iter()
                    .map(|(unit, exp)| {
                        if *exp == Fraction::ONE {
                            unit.symbol()
                        } else {
                            format!("{}^{}", unit.symbol(), exp)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("·")
            }
        }
    }

    /// The descriptive name, when one was assigned
    pub fn name(&self) -> Option<String> {
        match &*self.inner {
            UnitKind::Base { name, .. }
            | UnitKind::Alternate { name, .. }
            | UnitKind::Transformed { name, .. } => name.clone(),
            UnitKind::Product { .. } => None,
        }
    }

    /// The converter from this unit's values to its system unit's values
    pub fn to_system(&self) -> UnitConverter {
        match &*self.inner {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => UnitConverter::identity(),
            UnitKind::Transformed {
                parent, converter, ..
            } => converter.and_then(&parent.to_system()),
            UnitKind::Product { converter, .. } => converter.clone(),
        }
    }

    /// The canonical representative of this unit's measurement branch
    pub fn system_unit(&self) -> Unit {
        match &*self.inner {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => self.clone(),
            UnitKind::Transformed { parent, .. } => parent.system_unit(),
            UnitKind::Product { components, .. } => {
                let systems: Vec<(Unit, Fraction)> = components
                    .iter()
                    .map(|(unit, exp)| (unit.system_unit(), *exp))
                    .collect();
                // the same exponent arithmetic already succeeded when this
                // product was built
                product(systems).unwrap_or_else(|_| Unit::one())
            }
        }
    }

    /// Whether this unit is its own system unit
    pub fn is_system_unit(&self) -> bool {
        match &*self.inner {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => true,
            UnitKind::Transformed { .. } => false,
            UnitKind::Product { components, .. } => {
                components.iter().all(|(unit, _)| unit.is_system_unit())
            }
        }
    }

    /// Whether two units share a dimension. Necessary but not sufficient
    /// for conversion; see [`Unit::converter_to`].
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension() == other.dimension()
    }

    /// Pointer identity: the exact same shared instance
    pub fn same_instance(&self, other: &Unit) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== Conversion ==========

    /// The converter taking this unit's values to `other`'s values.
    ///
    /// Succeeds only when both units share the same system-unit identity;
    /// equal dimensions alone are not enough.
    pub fn converter_to(&self, other: &Unit) -> Result<UnitConverter, UnitError> {
        if self == other {
            return Ok(UnitConverter::identity());
        }
        if self.system_unit() != other.system_unit() {
            return Err(UnitError::Incommensurable {
                from: self.symbol(),
                to: other.symbol(),
            });
        }
        Ok(self.to_system().and_then(&other.to_system().inverse()))
    }

    // ========== Algebra ==========

    /// Product of two units
    pub fn multiply(&self, other: &Unit) -> Result<Unit, UnitError> {
        let mut components = self.components();
        components.extend(other.components());
        product(components)
    }

    /// Quotient of two units
    pub fn divide(&self, other: &Unit) -> Result<Unit, UnitError> {
        let mut components = self.components();
        for (unit, exp) in other.components() {
            components.push((unit, exp.scale(-1)?));
        }
        product(components)
    }

    /// This unit raised to an integer power
    pub fn pow(&self, exponent: i32) -> Result<Unit, UnitError> {
        if exponent == 0 {
            return Ok(Unit::one());
        }
        let mut components = self.components();
        for (_, exp) in &mut components {
            *exp = exp.scale(exponent)?;
        }
        product(components)
    }

    /// The nth root of this unit; n must be positive
    pub fn nth_root(&self, degree: u32) -> Result<Unit, UnitError> {
        if degree == 0 {
            return Err(UnitError::InvalidArgument(
                "unit root degree must be positive".to_string(),
            ));
        }
        let degree = i32::try_from(degree)
            .map_err(|_| UnitError::NonIntegralExponent(i32::MAX))?;
        let mut components = self.components();
        for (_, exp) in &mut components {
            *exp = exp.div_int(degree)?;
        }
        product(components)
    }

    /// The product decomposition of this unit
    fn components(&self) -> Vec<(Unit, Fraction)> {
        match &*self.inner {
            UnitKind::Product { components, .. } => components.clone(),
            _ => vec![(self.clone(), Fraction::ONE)],
        }
    }
}

/// Build a product unit from components: merge duplicates, drop zero
/// exponents, collapse trivial results, and precompute the dimension and
/// system converter.
fn product(components: Vec<(Unit, Fraction)>) -> Result<Unit, UnitError> {
    let mut merged: Vec<(Unit, Fraction)> = Vec::new();
    for (unit, exp) in components {
        if exp.is_zero() {
            continue;
        }
        match merged.iter_mut().find(|(u, _)| *u == unit) {
            Some((_, existing)) => *existing = existing.add(&exp)?,
            None => merged.push((unit, exp)),
        }
    }
    merged.retain(|(_, exp)| !exp.is_zero());
    // Canonical component order: the same factors must yield the same
    // product node regardless of how the caller associated them.
    merged.sort_by(|(a, _), (b, _)| a.symbol().cmp(&b.symbol()));

    if merged.is_empty() {
        return Ok(Unit::one());
    }
    if merged.len() == 1 && merged[0].1 == Fraction::ONE {
        return Ok(merged.remove(0).0);
    }

    let mut dimension = Dimension::DIMENSIONLESS;
    let mut converter = UnitConverter::identity();
    for (unit, exp) in &merged {
        let to_system = unit.to_system();
        if !to_system.is_linear() {
            return Err(UnitError::InvalidArgument(format!(
                "unit {} has an offset converter and cannot enter a product",
                unit.symbol()
            )));
        }
        dimension = dimension.multiply(&unit.dimension().pow_fraction(exp)?)?;
        converter = converter.and_then(&raise(to_system, exp)?);
    }

    Ok(Unit {
        inner: Arc::new(UnitKind::Product {
            components: merged,
            dimension,
            converter,
        }),
    })
}

/// Raise a linear converter to a rational exponent, fusing rational scale
/// chains where possible
fn raise(converter: UnitConverter, exp: &Fraction) -> Result<UnitConverter, UnitError> {
    let powered = match (converter.scale_rational(), exp.numerator()) {
        (Ok(factor), n) => UnitConverter::scale(factor.pow(n)?)?,
        (Err(_), n) => UnitConverter::power(converter, n)?,
    };
    if exp.is_integer() {
        Ok(powered)
    } else {
        let degree = u32::try_from(exp.denominator())
            .map_err(|_| UnitError::NonIntegralExponent(exp.denominator()))?;
        UnitConverter::root(powered, degree)
    }
}

/// Generated symbol for an unnamed transformed unit: rational coefficients
/// render as a prefix, offsets as an explicit annotation.
fn derived_symbol(parent: &Unit, converter: &UnitConverter) -> String {
    if converter.is_identity() {
        return parent.symbol();
    }
    if let Some(factor) = converter.as_scale() {
        return format!("{}·{}", factor, parent.symbol());
    }
    if let Some(offset) = converter.as_shift() {
        if offset.is_negative() {
            return format!("({}{})", parent.symbol(), offset);
        }
        return format!("({}+{})", parent.symbol(), offset);
    }
    format!("{}[{}]", parent.symbol(), converter)
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A multiplicative unit prefix (kilo, milli, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    symbol: String,
    name: String,
    factor: Rational,
}

impl Prefix {
    /// A prefix with the given scale factor; a zero factor fails
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        factor: Rational,
    ) -> Result<Self, UnitError> {
        if factor.is_zero() {
            return Err(UnitError::InvalidArgument(
                "prefix factor must be non-zero".to_string(),
            ));
        }
        Ok(Prefix {
            symbol: symbol.into(),
            name: name.into(),
            factor,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factor(&self) -> &Rational {
        &self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensura_core::PrecisionContext;

    fn metre() -> Unit {
        Unit::base("m", Dimension::LENGTH)
    }

    fn second() -> Unit {
        Unit::base("s", Dimension::TIME)
    }

    fn kelvin() -> Unit {
        Unit::base("K", Dimension::TEMPERATURE)
    }

    fn kilometre() -> Unit {
        metre().transform(UnitConverter::scale_of(1000, 1).unwrap())
    }

    fn celsius() -> Unit {
        kelvin().transform(UnitConverter::shift(Rational::new(27315, 100).unwrap()))
    }

    fn fahrenheit() -> Unit {
        // °F -> K: (x + 459.67) * 5/9
        let to_kelvin = UnitConverter::shift(Rational::new(45967, 100).unwrap())
            .and_then(&UnitConverter::scale_of(5, 9).unwrap());
        kelvin().transform(to_kelvin)
    }

    #[test]
    fn test_base_unit_is_its_own_system_unit() {
        let m = metre();
        assert!(m.is_system_unit());
        assert!(m.to_system().is_identity());
        assert_eq!(m.system_unit(), m);
    }

    #[test]
    fn test_transform_identity_returns_same_instance() {
        let m = metre();
        let same = m.transform(UnitConverter::identity());
        assert!(m.same_instance(&same));
    }

    #[test]
    fn test_transform_flattens() {
        let km = kilometre();
        let back = km.transform(UnitConverter::scale_of(1, 1000).unwrap());
        assert!(back.same_instance(&metre()) || back == metre());
    }

    #[test]
    fn test_km_to_m_conversion() {
        let km = kilometre();
        let c = km.converter_to(&metre()).unwrap();
        assert_eq!(c.convert_f64(1.0), 1000.0);
        let back = metre().converter_to(&km).unwrap();
        assert_eq!(back.convert_f64(500.0), 0.5);
    }

    #[test]
    fn test_incompatible_dimensions() {
        let m = metre();
        let s = second();
        assert!(!m.is_compatible(&s));
        assert!(matches!(
            m.converter_to(&s),
            Err(UnitError::Incommensurable { .. })
        ));
    }

    #[test]
    fn test_compatible_but_incommensurable_alternates() {
        let radian = Unit::one().alternate("rad").unwrap();
        let steradian = Unit::one().alternate("sr").unwrap();

        assert!(radian.is_compatible(&steradian));
        assert!(matches!(
            radian.converter_to(&steradian),
            Err(UnitError::Incommensurable { from, to }) if from == "rad" && to == "sr"
        ));
        // conversion to itself is still fine
        assert!(radian.converter_to(&radian).unwrap().is_identity());
    }

    #[test]
    fn test_alternate_requires_system_unit() {
        assert!(matches!(
            kilometre().alternate("klick"),
            Err(UnitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        let c = celsius().converter_to(&fahrenheit()).unwrap();
        assert!((c.convert_f64(100.0) - 212.0).abs() < 1e-9);
        assert!((c.convert_f64(0.0) - 32.0).abs() < 1e-9);

        let ctx = PrecisionContext::default();
        let exact = c
            .convert_exact(&"0".parse().unwrap(), &ctx)
            .unwrap();
        assert_eq!(exact.to_string(), "32");
    }

    #[test]
    fn test_product_dimension_and_converter() {
        let kmh = kilometre()
            .divide(&second().transform(UnitConverter::scale_of(3600, 1).unwrap()))
            .unwrap();
        let ms = metre().divide(&second()).unwrap();

        assert_eq!(
            kmh.dimension(),
            Dimension::LENGTH.divide(&Dimension::TIME).unwrap()
        );
        assert_eq!(kmh.system_unit(), ms);

        let c = kmh.converter_to(&ms).unwrap();
        assert!((c.convert_f64(36.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_product_merges_components() {
        let m = metre();
        let area = m.multiply(&m).unwrap();
        assert_eq!(area.dimension(), Dimension::LENGTH.pow(2).unwrap());
        assert_eq!(area, m.pow(2).unwrap());

        // dividing back collapses to the unit itself
        let again = area.divide(&m).unwrap();
        assert_eq!(again, m);

        // full cancellation gives one
        assert_eq!(m.divide(&m).unwrap(), Unit::one());
    }

    #[test]
    fn test_product_is_commutative() {
        // the same factors in any order land on the same product node
        let a = metre().divide(&second()).unwrap();
        let b = second().pow(-1).unwrap().multiply(&metre()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.system_unit(), b.system_unit());
        assert!(a.converter_to(&b).unwrap().is_identity());

        let kmh = kilometre()
            .divide(&second().transform(UnitConverter::scale_of(3600, 1).unwrap()))
            .unwrap();
        let hmk = second()
            .transform(UnitConverter::scale_of(3600, 1).unwrap())
            .pow(-1)
            .unwrap()
            .multiply(&kilometre())
            .unwrap();
        assert_eq!(kmh, hmk);
        let c = kmh.converter_to(&hmk).unwrap();
        assert_eq!(c.convert_f64(36.0), 36.0);
    }

    #[test]
    fn test_named_product_keeps_product_symbol() {
        let speed = metre().divide(&second()).unwrap().with_name("speed");
        assert_eq!(speed.symbol(), metre().divide(&second()).unwrap().symbol());
        assert_eq!(speed.name().as_deref(), Some("speed"));
    }

    #[test]
    fn test_nth_root_of_product() {
        let area = kilometre().pow(2).unwrap();
        let side = area.nth_root(2).unwrap();
        assert_eq!(side, kilometre());

        let half = metre().nth_root(2).unwrap();
        assert_eq!(half.dimension(), Dimension::LENGTH.root(2).unwrap());
        assert_eq!(half.symbol(), "m^1/2");
        assert!(matches!(
            metre().nth_root(0),
            Err(UnitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_offset_units_cannot_enter_products() {
        assert!(matches!(
            celsius().multiply(&metre()),
            Err(UnitError::InvalidArgument(_))
        ));
        assert!(matches!(celsius().pow(2), Err(UnitError::InvalidArgument(_))));
    }

    #[test]
    fn test_prefix_accumulates() {
        let kilo = Prefix::new("k", "kilo", Rational::new(1000, 1).unwrap()).unwrap();
        let km = metre().with_prefix(&kilo);
        assert_eq!(km.symbol(), "km");
        assert_eq!(km.converter_to(&metre()).unwrap().convert_f64(1.0), 1000.0);

        let mega_m = km.with_prefix(&kilo);
        assert_eq!(
            mega_m.converter_to(&metre()).unwrap().convert_f64(1.0),
            1e6
        );
        assert!(Prefix::new("z", "zero", Rational::zero()).is_err());
    }

    #[test]
    fn test_derived_symbols() {
        let km = kilometre();
        assert_eq!(km.symbol(), "1000·m");
        assert_eq!(celsius().symbol(), "(K+5463/20)");

        let named = km.with_symbol("km").with_name("kilometre");
        assert_eq!(named.symbol(), "km");
        assert_eq!(named.name().as_deref(), Some("kilometre"));
        // overrides change neither dimension nor system unit
        assert_eq!(named.dimension(), km.dimension());
        assert_eq!(named.system_unit(), metre());
    }

    #[test]
    fn test_unit_one() {
        let one = Unit::one();
        assert!(one.dimension().is_dimensionless());
        assert_eq!(one.symbol(), "1");
        assert!(one.is_system_unit());
    }
}
