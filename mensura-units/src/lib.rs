//! Mensura Units - Dimensional analysis and unit conversion
//!
//! Provides unit-aware quantities over an exact numeric core:
//! - `Dimension`: rational exponents of the 7 SI base dimensions
//! - `UnitConverter`: composable value maps (scale, offset, root, power)
//!   with both f64 and exact decimal evaluation
//! - `Unit`: base, alternate, transformed, and product units; conversion
//!   is gated on shared system-unit identity, not on dimensions alone
//! - `Quantity`: value + unit with kind dispatch through a registry
//! - `si`: the SI catalog and default quantity kinds

mod converter;
mod dimension;
mod error;
mod kind;
mod quantity;
pub mod si;
mod unit;

pub use converter::UnitConverter;
pub use dimension::{Dimension, Fraction};
pub use dimension::{AMOUNT, CURRENT, LENGTH, LUMINOSITY, MASS, TEMPERATURE, TIME};
pub use error::UnitError;
pub use kind::{
    kind_for_dimension, kind_named, register_kind, registry, KindRegistry, QuantityKind,
};
pub use quantity::{Quantity, Value};
pub use unit::{Prefix, Unit};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Dimension, Prefix, Quantity, Unit, UnitConverter, UnitError, Value};
    pub use mensura_core::prelude::*;
}
