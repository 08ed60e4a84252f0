//! Unit-layer errors
//!
//! Every failure is local and synchronous: it surfaces to the immediate
//! caller, who decides whether to retry with a different precision context
//! or abandon the operation. No partial results are returned.

use mensura_core::NumericError;
use thiserror::Error;

/// Error type for converter, unit, and quantity operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation requires a linear converter")]
    NonLinearConverter,

    #[error("cannot convert {from} to {to}: units are not commensurable")]
    Incommensurable { from: String, to: String },

    #[error("dimension exponent is not representable after scaling by {0}")]
    NonIntegralExponent(i32),

    #[error("no quantity kind registered for {0}")]
    UnknownKind(String),

    #[error(transparent)]
    Numeric(#[from] NumericError),
}
