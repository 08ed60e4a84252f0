//! SI unit catalog
//!
//! Base units, the usual prefixes, and a set of derived and alternate
//! units, all defined over literal factors (the unwraps cannot fire).
//! `register_default_kinds` installs the standard quantity kinds into the
//! process-wide registry; registration is idempotent.

use mensura_core::Rational;

use crate::kind::{register_kind, QuantityKind};
use crate::{Dimension, Prefix, Unit, UnitConverter};

// ========== Base units ==========

pub fn metre() -> Unit {
    Unit::base("m", Dimension::LENGTH).with_name("metre")
}

/// The SI mass base unit is the kilogram, not the gram
pub fn kilogram() -> Unit {
    Unit::base("kg", Dimension::MASS).with_name("kilogram")
}

pub fn second() -> Unit {
    Unit::base("s", Dimension::TIME).with_name("second")
}

pub fn ampere() -> Unit {
    Unit::base("A", Dimension::CURRENT).with_name("ampere")
}

pub fn kelvin() -> Unit {
    Unit::base("K", Dimension::TEMPERATURE).with_name("kelvin")
}

pub fn mole() -> Unit {
    Unit::base("mol", Dimension::AMOUNT).with_name("mole")
}

pub fn candela() -> Unit {
    Unit::base("cd", Dimension::LUMINOSITY).with_name("candela")
}

/// The dimensionless unit one
pub fn one() -> Unit {
    Unit::one()
}

// ========== Prefixes ==========

fn prefix(symbol: &str, name: &str, num: i64, den: i64) -> Prefix {
    Prefix::new(symbol, name, Rational::new(num, den).unwrap()).unwrap()
}

pub fn giga() -> Prefix {
    prefix("G", "giga", 1_000_000_000, 1)
}

pub fn mega() -> Prefix {
    prefix("M", "mega", 1_000_000, 1)
}

pub fn kilo() -> Prefix {
    prefix("k", "kilo", 1000, 1)
}

pub fn hecto() -> Prefix {
    prefix("h", "hecto", 100, 1)
}

pub fn deci() -> Prefix {
    prefix("d", "deci", 1, 10)
}

pub fn centi() -> Prefix {
    prefix("c", "centi", 1, 100)
}

pub fn milli() -> Prefix {
    prefix("m", "milli", 1, 1000)
}

pub fn micro() -> Prefix {
    prefix("µ", "micro", 1, 1_000_000)
}

pub fn nano() -> Prefix {
    prefix("n", "nano", 1, 1_000_000_000)
}

// ========== Derived and alternate units ==========

pub fn kilometre() -> Unit {
    metre().with_prefix(&kilo()).with_name("kilometre")
}

pub fn gram() -> Unit {
    kilogram()
        .transform(UnitConverter::scale_of(1, 1000).unwrap())
        .with_symbol("g")
        .with_name("gram")
}

pub fn minute() -> Unit {
    second()
        .transform(UnitConverter::scale_of(60, 1).unwrap())
        .with_symbol("min")
        .with_name("minute")
}

pub fn hour() -> Unit {
    second()
        .transform(UnitConverter::scale_of(3600, 1).unwrap())
        .with_symbol("h")
        .with_name("hour")
}

/// Frequency: a distinct system-unit identity over s^-1
pub fn hertz() -> Unit {
    per_second().alternate("Hz").unwrap().with_name("hertz")
}

/// Radioactivity: compatible with hertz but not convertible to it
pub fn becquerel() -> Unit {
    per_second().alternate("Bq").unwrap().with_name("becquerel")
}

fn per_second() -> Unit {
    second().pow(-1).unwrap()
}

/// Plane angle: dimensionless with its own identity
pub fn radian() -> Unit {
    Unit::one().alternate("rad").unwrap().with_name("radian")
}

/// Solid angle: compatible with radian but not convertible to it
pub fn steradian() -> Unit {
    Unit::one().alternate("sr").unwrap().with_name("steradian")
}

pub fn newton() -> Unit {
    kilogram()
        .multiply(&metre())
        .unwrap()
        .divide(&second().pow(2).unwrap())
        .unwrap()
        .alternate("N")
        .unwrap()
        .with_name("newton")
}

pub fn joule() -> Unit {
    newton()
        .multiply(&metre())
        .unwrap()
        .alternate("J")
        .unwrap()
        .with_name("joule")
}

pub fn watt() -> Unit {
    joule()
        .divide(&second())
        .unwrap()
        .alternate("W")
        .unwrap()
        .with_name("watt")
}

/// Degree Celsius: kelvin shifted by 273.15
pub fn celsius() -> Unit {
    kelvin()
        .transform(UnitConverter::shift(Rational::new(27315, 100).unwrap()))
        .with_symbol("°C")
        .with_name("degree Celsius")
}

/// Degree Fahrenheit: x °F = (x + 459.67) * 5/9 K
pub fn fahrenheit() -> Unit {
    let to_kelvin = UnitConverter::shift(Rational::new(45967, 100).unwrap())
        .and_then(&UnitConverter::scale_of(5, 9).unwrap());
    kelvin()
        .transform(to_kelvin)
        .with_symbol("°F")
        .with_name("degree Fahrenheit")
}

pub fn metre_per_second() -> Unit {
    metre().divide(&second()).unwrap()
}

pub fn kilometre_per_hour() -> Unit {
    kilometre().divide(&hour()).unwrap()
}

// ========== Kind registry ==========

/// Install the default quantity kinds. First registration of a name wins,
/// so calling this repeatedly is harmless; the order below fixes which
/// kind a dimension lookup resolves to.
pub fn register_default_kinds() {
    register_kind(QuantityKind::new("Length", metre()));
    register_kind(QuantityKind::new("Mass", kilogram()));
    register_kind(QuantityKind::new("Time", second()));
    register_kind(QuantityKind::new("ElectricCurrent", ampere()));
    register_kind(QuantityKind::new("Temperature", kelvin()));
    register_kind(QuantityKind::new("AmountOfSubstance", mole()));
    register_kind(QuantityKind::new("LuminousIntensity", candela()));
    register_kind(QuantityKind::new("Frequency", hertz()));
    register_kind(QuantityKind::new("Radioactivity", becquerel()));
    register_kind(QuantityKind::new("Angle", radian()));
    register_kind(QuantityKind::new("SolidAngle", steradian()));
    register_kind(QuantityKind::new("Force", newton()));
    register_kind(QuantityKind::new("Energy", joule()));
    register_kind(QuantityKind::new("Power", watt()));
    register_kind(QuantityKind::new("Speed", metre_per_second()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::kind_named;
    use crate::UnitError;
    use mensura_core::PrecisionContext;

    #[test]
    fn test_base_units() {
        assert_eq!(metre().symbol(), "m");
        assert_eq!(kilogram().dimension(), Dimension::MASS);
        assert!(second().is_system_unit());
        assert_eq!(candela().name().as_deref(), Some("candela"));
    }

    #[test]
    fn test_prefixed_units() {
        let km = kilometre();
        assert_eq!(km.symbol(), "km");
        assert_eq!(km.converter_to(&metre()).unwrap().convert_f64(2.0), 2000.0);

        let mm = metre().with_prefix(&milli());
        assert_eq!(mm.symbol(), "mm");
        assert_eq!(mm.converter_to(&metre()).unwrap().convert_f64(1.0), 0.001);
    }

    #[test]
    fn test_gram_is_scaled_kilogram() {
        let c = gram().converter_to(&kilogram()).unwrap();
        assert_eq!(c.convert_f64(500.0), 0.5);
    }

    #[test]
    fn test_speed_conversion() {
        let c = kilometre_per_hour()
            .converter_to(&metre_per_second())
            .unwrap();
        assert!((c.convert_f64(36.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_hertz_and_becquerel_stay_apart() {
        assert!(hertz().is_compatible(&becquerel()));
        assert!(matches!(
            hertz().converter_to(&becquerel()),
            Err(UnitError::Incommensurable { .. })
        ));
        assert!(matches!(
            radian().converter_to(&steradian()),
            Err(UnitError::Incommensurable { .. })
        ));
    }

    #[test]
    fn test_temperature_conversions() {
        let ctx = PrecisionContext::default();
        let c_to_f = celsius().converter_to(&fahrenheit()).unwrap();
        assert!((c_to_f.convert_f64(100.0) - 212.0).abs() < 1e-9);

        let boiling = c_to_f
            .convert_exact(&"100".parse().unwrap(), &ctx)
            .unwrap();
        assert_eq!(boiling.to_string(), "212");

        let to_kelvin = celsius().converter_to(&kelvin()).unwrap();
        assert!((to_kelvin.convert_f64(0.0) - 273.15).abs() < 1e-9);
    }

    #[test]
    fn test_newton_decomposition() {
        let base = kilogram()
            .multiply(&metre())
            .unwrap()
            .divide(&second().pow(2).unwrap())
            .unwrap();
        assert_eq!(newton().dimension(), Dimension::FORCE);
        assert_eq!(newton().system_unit(), newton());
        // the alternate is a new identity: not convertible back to the
        // anonymous product
        assert!(matches!(
            newton().converter_to(&base),
            Err(UnitError::Incommensurable { .. })
        ));
    }

    #[test]
    fn test_default_kinds() {
        register_default_kinds();
        register_default_kinds(); // idempotent

        let force = kind_named("force").unwrap();
        assert_eq!(force.unit(), &newton());
        assert_eq!(force.dimension(), Dimension::FORCE);
        assert!(kind_named("Frequency").is_ok());
    }
}
