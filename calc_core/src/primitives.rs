//! # Arithmetic Primitives
//!
//! The arithmetic shared by the accumulator calculator and the expression
//! evaluator. Each primitive has a fixed domain-error policy:
//!
//! | Primitive | Fails with |
//! |-----------|------------|
//! | `factorial(n)` | `DomainError` for negative or non-integral `n`, `Overflow` for `n > 170` |
//! | `log10(x)`, `ln(x)` | `DomainError` for `x <= 0` |
//! | `sqrt(x)` | `DomainError` for `x < 0` |
//! | `operate(a, /, 0)` | `DivideByZero` |
//!
//! Trigonometric functions take their argument in degrees.
//!
//! ```rust
//! use calc_core::primitives::{factorial, operate, BinaryOp};
//!
//! assert_eq!(factorial(5.0).unwrap(), 120.0);
//! assert_eq!(operate(2.0, BinaryOp::Multiply, 4.0).unwrap(), 8.0);
//! assert!(operate(1.0, BinaryOp::Divide, 0.0).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::format_number;

/// Largest argument whose factorial is finite in f64
pub const FACTORIAL_LIMIT: f64 = 170.0;

// =============================================================================
// SINGLE-ARGUMENT PRIMITIVES
// =============================================================================

/// n! for a non-negative integer n.
pub fn factorial(n: f64) -> CalcResult<f64> {
    if n.is_nan() || n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::domain_error(
            "factorial",
            format_number(n),
            "argument must be a non-negative integer",
        ));
    }
    if n > FACTORIAL_LIMIT {
        return Err(CalcError::overflow("factorial", format_number(n)));
    }

    let mut product = 1.0;
    let mut i = 2.0;
    while i <= n {
        product *= i;
        i += 1.0;
    }
    Ok(product)
}

/// Sine of an angle in degrees
#[inline]
pub fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle in degrees
#[inline]
pub fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

/// Tangent of an angle in degrees
#[inline]
pub fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

/// Base-10 logarithm
pub fn log10(x: f64) -> CalcResult<f64> {
    if x.is_nan() || x <= 0.0 {
        return Err(CalcError::domain_error("log", format_number(x), "argument must be positive"));
    }
    Ok(x.log10())
}

/// Natural logarithm
pub fn ln(x: f64) -> CalcResult<f64> {
    if x.is_nan() || x <= 0.0 {
        return Err(CalcError::domain_error("ln", format_number(x), "argument must be positive"));
    }
    Ok(x.ln())
}

/// Square root
pub fn sqrt(x: f64) -> CalcResult<f64> {
    if x.is_nan() || x < 0.0 {
        return Err(CalcError::domain_error("sqrt", format_number(x), "argument must not be negative"));
    }
    Ok(x.sqrt())
}

/// x²
#[inline]
pub fn square(x: f64) -> f64 {
    x * x
}

/// Named single-argument functions reachable from either calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Factorial,
    Square,
}

impl UnaryFn {
    /// Every function, in button order
    pub const ALL: [UnaryFn; 8] = [
        UnaryFn::Sin,
        UnaryFn::Cos,
        UnaryFn::Tan,
        UnaryFn::Log,
        UnaryFn::Ln,
        UnaryFn::Sqrt,
        UnaryFn::Factorial,
        UnaryFn::Square,
    ];

    /// Apply the function to `x`.
    pub fn apply(self, x: f64) -> CalcResult<f64> {
        match self {
            UnaryFn::Sin => Ok(sin_deg(x)),
            UnaryFn::Cos => Ok(cos_deg(x)),
            UnaryFn::Tan => Ok(tan_deg(x)),
            UnaryFn::Log => log10(x),
            UnaryFn::Ln => ln(x),
            UnaryFn::Sqrt => sqrt(x),
            UnaryFn::Factorial => factorial(x),
            UnaryFn::Square => Ok(square(x)),
        }
    }

    /// Name as written in expressions and on accumulator keys
    pub fn name(self) -> &'static str {
        match self {
            UnaryFn::Sin => "sin",
            UnaryFn::Cos => "cos",
            UnaryFn::Tan => "tan",
            UnaryFn::Log => "log",
            UnaryFn::Ln => "ln",
            UnaryFn::Sqrt => "sqrt",
            UnaryFn::Factorial => "!",
            UnaryFn::Square => "^",
        }
    }

    /// Resolve a function name used as a call prefix (`sin(`, `sqrt(`, ...).
    ///
    /// `!` and `^` are postfix/infix in expressions and are not callable.
    pub fn from_call_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(UnaryFn::Sin),
            "cos" => Some(UnaryFn::Cos),
            "tan" => Some(UnaryFn::Tan),
            "log" => Some(UnaryFn::Log),
            "ln" => Some(UnaryFn::Ln),
            "sqrt" => Some(UnaryFn::Sqrt),
            _ => None,
        }
    }
}

// =============================================================================
// BINARY OPERATIONS
// =============================================================================

/// The four accumulator operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl BinaryOp {
    /// Operator symbol
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }

    /// Parse an operator symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Subtract),
            '*' => Some(BinaryOp::Multiply),
            '/' => Some(BinaryOp::Divide),
            _ => None,
        }
    }
}

/// Apply a binary operator.
///
/// Results follow IEEE-754 except that a zero divisor yields
/// `DivideByZero` and a NaN operand yields `InvalidInput`.
pub fn operate(a: f64, op: BinaryOp, b: f64) -> CalcResult<f64> {
    if a.is_nan() || b.is_nan() {
        return Err(CalcError::invalid_input(
            "operand",
            format!("{} {} {}", format_number(a), op.symbol(), format_number(b)),
            "operand is not a number",
        ));
    }

    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Subtract => Ok(a - b),
        BinaryOp::Multiply => Ok(a * b),
        BinaryOp::Divide => {
            if b == 0.0 {
                return Err(CalcError::divide_by_zero(format_number(a)));
            }
            Ok(a / b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_factorial_small() {
        assert_eq!(factorial(0.0).unwrap(), 1.0);
        assert_eq!(factorial(1.0).unwrap(), 1.0);
        assert_eq!(factorial(5.0).unwrap(), 120.0);
        assert_eq!(factorial(10.0).unwrap(), 3_628_800.0);
    }

    #[test]
    fn test_factorial_limits() {
        assert!(factorial(170.0).unwrap().is_finite());
        assert!(matches!(factorial(171.0), Err(CalcError::Overflow { .. })));
        assert!(matches!(factorial(-3.0), Err(CalcError::DomainError { .. })));
        assert!(matches!(factorial(2.5), Err(CalcError::DomainError { .. })));
    }

    #[test]
    fn test_trig_uses_degrees() {
        assert!((sin_deg(30.0) - 0.5).abs() < TOL);
        assert!((cos_deg(60.0) - 0.5).abs() < TOL);
        assert!((tan_deg(45.0) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_log_domains() {
        assert!((log10(1000.0).unwrap() - 3.0).abs() < TOL);
        assert!((ln(std::f64::consts::E).unwrap() - 1.0).abs() < TOL);
        assert!(log10(0.0).is_err());
        assert!(ln(-1.0).is_err());
    }

    #[test]
    fn test_sqrt_domain() {
        assert_eq!(sqrt(16.0).unwrap(), 4.0);
        assert_eq!(sqrt(0.0).unwrap(), 0.0);
        assert!(matches!(sqrt(-1.0), Err(CalcError::DomainError { .. })));
    }

    #[test]
    fn test_operate_ieee() {
        assert_eq!(operate(0.1, BinaryOp::Add, 0.2).unwrap(), 0.1 + 0.2);
        assert_eq!(operate(7.0, BinaryOp::Subtract, 10.0).unwrap(), -3.0);
        assert_eq!(operate(1.5, BinaryOp::Multiply, 4.0).unwrap(), 6.0);
        assert_eq!(operate(1.0, BinaryOp::Divide, 3.0).unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn test_operate_divide_by_zero() {
        assert!(matches!(
            operate(5.0, BinaryOp::Divide, 0.0),
            Err(CalcError::DivideByZero { .. })
        ));
        assert!(matches!(
            operate(0.0, BinaryOp::Divide, -0.0),
            Err(CalcError::DivideByZero { .. })
        ));
    }

    #[test]
    fn test_unary_fn_dispatch() {
        assert_eq!(UnaryFn::Square.apply(-3.0).unwrap(), 9.0);
        assert_eq!(UnaryFn::from_call_name("sqrt"), Some(UnaryFn::Sqrt));
        assert_eq!(UnaryFn::from_call_name("exp"), None);
        assert_eq!(BinaryOp::from_symbol('*'), Some(BinaryOp::Multiply));
    }
}
