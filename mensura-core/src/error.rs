//! Numeric errors
//!
//! Errors never crash the system. They are values that propagate through
//! computations and surface to the immediate caller; there is no retry
//! machinery inside the numeric layer.

use thiserror::Error;

/// Error type for numeric operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NumericError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("root extraction did not converge within {0} iterations")]
    NonConvergence(usize),
}
