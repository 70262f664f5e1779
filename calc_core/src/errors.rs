//! # Error Types
//!
//! Structured error types for calc_core. Every core operation recovers its
//! failures at the operation boundary and hands one of these back to the
//! caller; nothing in the engine panics on user input.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn checked_ln(x: f64) -> CalcResult<f64> {
//!     if x <= 0.0 {
//!         return Err(CalcError::domain_error("ln", x.to_string(), "argument must be positive"));
//!     }
//!     Ok(x.ln())
//! }
//!
//! assert_eq!(checked_ln(-1.0).unwrap_err().error_code(), "DOMAIN_ERROR");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculator, conversion and configuration operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A numeral or date could not be parsed, or is out of the accepted range
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A function was applied outside its domain (log of 0, sqrt of -1, 2.5!)
    #[error("Domain error in {function}({value}): {reason}")]
    DomainError {
        function: String,
        value: String,
        reason: String,
    },

    /// Division with a zero divisor, or a result that overflowed to infinity
    #[error("Division by zero: {dividend} / 0")]
    DivideByZero { dividend: String },

    /// Factorial argument too large to represent
    #[error("Overflow in {function}({value})")]
    Overflow { function: String, value: String },

    /// Malformed expression text
    #[error("Syntax error at {position} in '{expression}': {reason}")]
    SyntaxError {
        expression: String,
        position: usize,
        reason: String,
    },

    /// No currency rate or unit entry for the requested key
    #[error("Lookup miss in {table}: {key}")]
    LookupMiss { table: String, key: String },

    /// Configuration file I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Configuration schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DomainError
    pub fn domain_error(function: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DomainError {
            function: function.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DivideByZero error
    pub fn divide_by_zero(dividend: impl Into<String>) -> Self {
        CalcError::DivideByZero {
            dividend: dividend.into(),
        }
    }

    /// Create an Overflow error
    pub fn overflow(function: impl Into<String>, value: impl Into<String>) -> Self {
        CalcError::Overflow {
            function: function.into(),
            value: value.into(),
        }
    }

    /// Create a SyntaxError
    pub fn syntax(expression: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        CalcError::SyntaxError {
            expression: expression.into(),
            position,
            reason: reason.into(),
        }
    }

    /// Create a LookupMiss error
    pub fn lookup_miss(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::LookupMiss {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for the failures an arithmetic evaluation can produce.
    ///
    /// Lookup and configuration failures are not arithmetic and never reach
    /// a calculator display.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::DomainError { .. }
                | CalcError::DivideByZero { .. }
                | CalcError::Overflow { .. }
                | CalcError::SyntaxError { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::DomainError { .. } => "DOMAIN_ERROR",
            CalcError::DivideByZero { .. } => "DIVIDE_BY_ZERO",
            CalcError::Overflow { .. } => "OVERFLOW",
            CalcError::SyntaxError { .. } => "SYNTAX_ERROR",
            CalcError::LookupMiss { .. } => "LOOKUP_MISS",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::syntax("2+*3", 2, "unexpected operator");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"SyntaxError\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::divide_by_zero("10").error_code(), "DIVIDE_BY_ZERO");
        assert_eq!(CalcError::overflow("factorial", "171").error_code(), "OVERFLOW");
        assert_eq!(CalcError::lookup_miss("currency", "USD->XYZ").error_code(), "LOOKUP_MISS");
    }

    #[test]
    fn test_arithmetic_classification() {
        assert!(CalcError::domain_error("sqrt", "-1", "negative").is_arithmetic());
        assert!(!CalcError::lookup_miss("currency", "USD->XYZ").is_arithmetic());
        assert!(!CalcError::SerializationError { reason: "bad".into() }.is_arithmetic());
    }

    #[test]
    fn test_error_display() {
        let error = CalcError::divide_by_zero("10");
        assert_eq!(error.to_string(), "Division by zero: 10 / 0");
    }
}
