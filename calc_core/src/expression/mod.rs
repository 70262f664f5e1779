//! # Expression Calculator
//!
//! The free-text calculator flavor: the user builds an expression string key
//! by key and `=` evaluates it.
//!
//! - [`lexer`] - tokenization of the expression text
//! - [`parser`] - recursive-descent parser producing an [`Expr`] tree
//! - [`state`] - the key-driven [`ExpressionState`] machine
//!
//! Percent and factorial are grammar rules on numeric literals rather than
//! text substitutions: `N%` is `N/100` (so `200+50%` is `200.5`) and `N!` is
//! the factorial of an integer literal.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::expression::evaluate;
//! use calc_core::errors::CalcError;
//!
//! assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
//! assert_eq!(evaluate("5!").unwrap(), 120.0);
//! assert!(matches!(evaluate("10/0"), Err(CalcError::DivideByZero { .. })));
//! assert!(matches!(evaluate("sqrt(-1)"), Err(CalcError::DomainError { .. })));
//! ```

pub mod lexer;
pub mod parser;
pub mod state;

use tracing::debug;

use crate::errors::{CalcError, CalcResult};

pub use parser::{parse, Constant, Expr, InfixOp};
pub use state::{ExprKey, ExpressionState};

/// Evaluate an expression to a finite number.
///
/// An infinite result maps to `DivideByZero` and a NaN result to
/// `DomainError`. Malformed text fails with `SyntaxError`.
pub fn evaluate(text: &str) -> CalcResult<f64> {
    let outcome = parse(text).and_then(|expr| expr.eval()).and_then(|value| {
        if value.is_infinite() {
            Err(CalcError::divide_by_zero(text))
        } else if value.is_nan() {
            Err(CalcError::domain_error("expression", text, "result is not a number"))
        } else {
            Ok(value)
        }
    });

    match &outcome {
        Ok(value) => debug!(expression = text, value, "evaluated"),
        Err(error) => debug!(expression = text, code = error.error_code(), "evaluation failed"),
    }

    outcome
}

/// Text shown in the result display for an evaluation failure
pub fn display_tag(error: &CalcError) -> &'static str {
    match error {
        CalcError::DivideByZero { .. } => "Division by Zero",
        _ => "Error",
    }
}
