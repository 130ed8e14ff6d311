//! Error types for shipcascade

use crate::resolve::UnavailableReason;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// shipcascade errors
///
/// Unavailability of a method for an address is a normal outcome and is
/// modelled by [`crate::Resolution::Unavailable`]. It only becomes an
/// [`Error::Unavailable`] on the single-method pricing path, where the
/// caller asked for that method explicitly.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog parse error: {0}")]
    CatalogParse(String),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("Shipping method not found: {0}")]
    MethodNotFound(String),

    #[error("Shipping method already exists: {0}")]
    DuplicateMethod(String),

    #[error("Shipping method not available: {0}")]
    Unavailable(UnavailableReason),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Malformed request or method record
///
/// These indicate a caller bug rather than a business outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("order subtotal must be non-negative, got {0}")]
    NegativeSubtotal(rust_decimal::Decimal),

    #[error("{field} of method '{code}' must be non-negative")]
    NegativeAmount { code: String, field: String },

    #[error("cost of method '{code}' overflows")]
    AmountOverflow { code: String },

    #[error("method '{code}' has estimated_days_min {min} greater than estimated_days_max {max}")]
    InvertedEstimate { code: String, min: u32, max: u32 },

    #[error("method '{code}' requires a complete address, missing: {}", missing.join(", "))]
    IncompleteAddress { code: String, missing: Vec<String> },
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
