//! Mensura Core - Numeric foundation
//!
//! This crate provides the numeric types the unit-conversion layer is built
//! on:
//! - `Rational`: exact arbitrary-precision fractions
//! - `Decimal` / `PrecisionContext`: arbitrary-precision decimals with
//!   caller-controlled precision and rounding
//! - `nth_root`: decimal root extraction
//! - `NumericError`: numeric failures as values

mod decimal;
mod error;
mod rational;
mod root;

pub use decimal::{decimal_from_f64, decimal_to_f64, Decimal, PrecisionContext, Rounding, DEFAULT_DIGITS};
pub use error::NumericError;
pub use rational::Rational;
pub use root::{nth_root, MAX_ROOT_ITERATIONS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{nth_root, Decimal, NumericError, PrecisionContext, Rational, Rounding};
}
