//! # Accumulator Calculator
//!
//! The button-driven calculator flavor. A [`CalculatorState`] holds the
//! numeral being typed, the first operand, the pending operator and the
//! memory register; [`handle_token`] applies one [`Token`] and returns the
//! new state together with the text to display.
//!
//! ## Token classes
//!
//! - **Entry**: `0`-`9` and `.` build the current numeral.
//! - **Operators**: `+ - * /` and `=` fold the current numeral into the
//!   first operand, left to right (`2+3*4=` is `20`).
//! - **Specials**: `AC`/`C`, `+/-`, `%`, the single-operand functions
//!   `sin cos tan log ln sqrt ! ^` (`^` squares), and `MC M+ M- MR`.
//!
//! `%` with a pending operator takes a percentage of the first operand
//! (`200 + 10 %` shows `20`); otherwise it divides by 100.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::accumulator::{handle_token, CalculatorState, Token};
//!
//! let mut state = CalculatorState::default();
//! let mut display = String::new();
//! for t in ["5", "+", "3", "="] {
//!     (state, display) = handle_token(state, t.parse::<Token>().unwrap());
//! }
//! assert_eq!(display, "8");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::format::format_number;
use crate::primitives::{operate, BinaryOp, UnaryFn};

/// Display tag for a generic failure
pub const ERROR_TAG: &str = "Error";

/// Display tag for a division by zero
pub const DIVIDE_BY_ZERO_TAG: &str = "Error: Div by 0";

/// Display tag for a result too large to represent
pub const OVERFLOW_TAG: &str = "Error: Overflow";

/// Text shown in place of the numeral for a failure
pub fn display_tag(error: &CalcError) -> &'static str {
    match error {
        CalcError::DivideByZero { .. } => DIVIDE_BY_ZERO_TAG,
        CalcError::Overflow { .. } => OVERFLOW_TAG,
        _ => ERROR_TAG,
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// A key of the accumulator calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Digit(u8),
    Point,
    Operator(BinaryOp),
    Equals,
    /// `AC` or `C`
    Clear,
    /// `+/-`
    Negate,
    Percent,
    Function(UnaryFn),
    MemoryClear,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
}

impl FromStr for Token {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = match s {
            "." => Token::Point,
            "=" => Token::Equals,
            "AC" | "C" => Token::Clear,
            "+/-" => Token::Negate,
            "%" => Token::Percent,
            "sin" => Token::Function(UnaryFn::Sin),
            "cos" => Token::Function(UnaryFn::Cos),
            "tan" => Token::Function(UnaryFn::Tan),
            "log" => Token::Function(UnaryFn::Log),
            "ln" => Token::Function(UnaryFn::Ln),
            "sqrt" => Token::Function(UnaryFn::Sqrt),
            "!" => Token::Function(UnaryFn::Factorial),
            "^" => Token::Function(UnaryFn::Square),
            "MC" => Token::MemoryClear,
            "M+" => Token::MemoryAdd,
            "M-" => Token::MemorySubtract,
            "MR" => Token::MemoryRecall,
            _ => {
                let mut chars = s.chars();
                let single = match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                };
                match single {
                    Some(c) if c.is_ascii_digit() => Token::Digit(c as u8 - b'0'),
                    Some(c) => BinaryOp::from_symbol(c)
                        .map(Token::Operator)
                        .ok_or_else(|| CalcError::invalid_input("token", s, "unknown calculator key"))?,
                    None => return Err(CalcError::invalid_input("token", s, "unknown calculator key")),
                }
            }
        };
        Ok(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Digit(d) => write!(f, "{}", d),
            Token::Point => write!(f, "."),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::Equals => write!(f, "="),
            Token::Clear => write!(f, "C"),
            Token::Negate => write!(f, "+/-"),
            Token::Percent => write!(f, "%"),
            Token::Function(func) => write!(f, "{}", func.name()),
            Token::MemoryClear => write!(f, "MC"),
            Token::MemoryAdd => write!(f, "M+"),
            Token::MemorySubtract => write!(f, "M-"),
            Token::MemoryRecall => write!(f, "MR"),
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// State of the accumulator calculator.
///
/// `current_input` is always a decimal numeral (possibly ending in `.`) or
/// one of the error tags. `operator` is only ever set while
/// `first_operand` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorState {
    current_input: String,
    first_operand: Option<f64>,
    operator: Option<BinaryOp>,
    awaiting_next_operand: bool,
    memory: f64,
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState {
            current_input: "0".to_string(),
            first_operand: None,
            operator: None,
            awaiting_next_operand: false,
            memory: 0.0,
        }
    }
}

/// Apply `token` to an owned state, returning the new state and its display.
pub fn handle_token(mut state: CalculatorState, token: Token) -> (CalculatorState, String) {
    state.press(token);
    let display = state.display().to_string();
    (state, display)
}

impl CalculatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text for the display
    pub fn display(&self) -> &str {
        &self.current_input
    }

    pub fn first_operand(&self) -> Option<f64> {
        self.first_operand
    }

    pub fn operator(&self) -> Option<BinaryOp> {
        self.operator
    }

    pub fn is_awaiting_next_operand(&self) -> bool {
        self.awaiting_next_operand
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    /// True while an error tag is displayed
    pub fn is_error(&self) -> bool {
        self.current_value().is_none()
    }

    /// `"C"` once anything has been entered, `"AC"` in the default state
    pub fn clear_label(&self) -> &'static str {
        if self.current_input != "0" || self.first_operand.is_some() || self.operator.is_some() {
            "C"
        } else {
            "AC"
        }
    }

    /// Numeric value of the displayed numeral, `None` for an error tag
    fn current_value(&self) -> Option<f64> {
        let numeral = self.current_input.trim_end_matches('.');
        numeral.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn current_value_or_error(&self) -> CalcResult<f64> {
        self.current_value()
            .ok_or_else(|| CalcError::invalid_input("current_input", self.current_input.clone(), "not a number"))
    }

    /// Apply one token.
    ///
    /// Memory tokens return the register value after the operation.
    pub fn press(&mut self, token: Token) -> Option<f64> {
        let memory = match token {
            Token::Digit(_) | Token::Point => {
                self.input_digit(token);
                None
            }
            Token::Operator(op) => {
                self.input_operator(Some(op));
                None
            }
            Token::Equals => {
                self.input_operator(None);
                None
            }
            Token::Clear => {
                self.reset();
                None
            }
            Token::Negate => {
                if let Some(value) = self.current_value() {
                    self.current_input = format_number(-value);
                }
                None
            }
            Token::Percent => {
                self.input_percent();
                None
            }
            Token::Function(func) => {
                self.input_function(func);
                None
            }
            Token::MemoryClear => {
                self.memory = 0.0;
                Some(self.memory)
            }
            Token::MemoryAdd => {
                if let Some(value) = self.current_value() {
                    self.memory += value;
                }
                Some(self.memory)
            }
            Token::MemorySubtract => {
                if let Some(value) = self.current_value() {
                    self.memory -= value;
                }
                Some(self.memory)
            }
            Token::MemoryRecall => {
                self.current_input = format_number(self.memory);
                self.awaiting_next_operand = true;
                Some(self.memory)
            }
        };

        debug!(
            token = %token,
            display = %self.current_input,
            first_operand = ?self.first_operand,
            operator = ?self.operator,
            awaiting = self.awaiting_next_operand,
            "accumulator token"
        );
        memory
    }

    /// Back to the defaults. Memory is kept.
    fn reset(&mut self) {
        self.current_input = "0".to_string();
        self.first_operand = None;
        self.operator = None;
        self.awaiting_next_operand = false;
    }

    /// Show an arithmetic failure and drop the pending chain.
    fn fail(&mut self, error: &CalcError) {
        debug!(code = error.error_code(), "accumulator chain failed");
        self.reset();
        self.current_input = display_tag(error).to_string();
    }

    fn input_digit(&mut self, token: Token) {
        let text = match token {
            Token::Digit(d) => char::from(b'0' + d).to_string(),
            _ => ".".to_string(),
        };
        let is_point = token == Token::Point;

        // An exponent-form display is not extended digit by digit
        if self.awaiting_next_operand || self.is_error() || self.current_input.contains('e') {
            self.current_input = if is_point { "0.".to_string() } else { text };
            self.awaiting_next_operand = false;
            return;
        }

        if is_point && self.current_input.contains('.') {
            return;
        }
        if self.current_input == "0" && !is_point {
            self.current_input = text;
        } else {
            self.current_input.push_str(&text);
        }
    }

    /// `next` is `None` for `=`
    fn input_operator(&mut self, next: Option<BinaryOp>) {
        // An error tag stays until cleared
        let Some(current) = self.current_value() else {
            return;
        };

        match (self.first_operand, self.operator) {
            (None, _) => self.first_operand = Some(current),
            (Some(first), Some(op)) => match operate(first, op, current) {
                Ok(result) if result.is_finite() => {
                    self.first_operand = Some(result);
                    self.current_input = format_number(result);
                }
                Ok(_) => {
                    self.fail(&CalcError::overflow(op.symbol().to_string(), format_number(current)));
                    return;
                }
                Err(error) => {
                    self.fail(&error);
                    return;
                }
            },
            // After `=` the result stays the first operand
            (Some(_), None) => {}
        }

        self.operator = next;
        self.awaiting_next_operand = true;
    }

    fn input_percent(&mut self) {
        let Some(current) = self.current_value() else {
            return;
        };

        let value = match (self.operator, self.first_operand) {
            (Some(_), Some(first)) if !self.awaiting_next_operand => current / 100.0 * first,
            _ => current / 100.0,
        };
        self.current_input = format_number(value);
    }

    fn input_function(&mut self, func: UnaryFn) {
        let outcome = self.current_value_or_error().and_then(|value| func.apply(value));
        self.current_input = match outcome {
            Ok(value) if value.is_finite() => format_number(value),
            Ok(_) => OVERFLOW_TAG.to_string(),
            Err(error) => display_tag(&error).to_string(),
        };
        self.awaiting_next_operand = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tokens: &[&str]) -> CalculatorState {
        let mut state = CalculatorState::default();
        for t in tokens {
            state.press(t.parse().unwrap());
        }
        state
    }

    #[test]
    fn test_token_parsing() {
        assert_eq!("7".parse::<Token>().unwrap(), Token::Digit(7));
        assert_eq!("/".parse::<Token>().unwrap(), Token::Operator(BinaryOp::Divide));
        assert_eq!("+/-".parse::<Token>().unwrap(), Token::Negate);
        assert_eq!("^".parse::<Token>().unwrap(), Token::Function(UnaryFn::Square));
        assert_eq!("AC".parse::<Token>().unwrap(), Token::Clear);
        assert!("xyz".parse::<Token>().is_err());
        assert!("".parse::<Token>().is_err());
    }

    #[test]
    fn test_simple_addition() {
        let (state, display) = ["5", "+", "3", "="]
            .iter()
            .fold((CalculatorState::default(), String::new()), |(state, _), t| {
                handle_token(state, t.parse().unwrap())
            });
        assert_eq!(display, "8");
        assert_eq!(state.operator(), None);
        assert!(state.is_awaiting_next_operand());
    }

    #[test]
    fn test_left_to_right_chaining() {
        assert_eq!(run(&["2", "+", "3", "*", "4", "="]).display(), "20");
        assert_eq!(run(&["2", "+", "3", "*"]).display(), "5");
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let state = run(&["5", "+", "3", "AC"]);
        assert_eq!(state, CalculatorState::default());
        assert_eq!(run(&["AC"]), CalculatorState::default());
    }

    #[test]
    fn test_clear_keeps_memory() {
        let state = run(&["5", "M+", "C"]);
        assert_eq!(state.display(), "0");
        assert_eq!(state.memory(), 5.0);
    }

    #[test]
    fn test_digit_entry() {
        assert_eq!(run(&["0", "0", "7"]).display(), "7");
        assert_eq!(run(&[".", "5"]).display(), "0.5");
        assert_eq!(run(&["1", ".", ".", "2", "."]).display(), "1.2");
        assert_eq!(run(&["0", ".", "0", "5"]).display(), "0.05");
    }

    #[test]
    fn test_awaiting_operand_starts_new_numeral() {
        let state = run(&["1", "2", "+", "."]);
        assert_eq!(state.display(), "0.");
        assert!(!state.is_awaiting_next_operand());
    }

    #[test]
    fn test_percent_without_operator() {
        assert_eq!(run(&["5", "%"]).display(), "0.05");
    }

    #[test]
    fn test_percent_of_first_operand() {
        let state = run(&["2", "0", "0", "+", "1", "0", "%"]);
        assert_eq!(state.display(), "20");
        assert_eq!(run(&["2", "0", "0", "+", "1", "0", "%", "="]).display(), "220");
    }

    #[test]
    fn test_percent_while_awaiting_divides() {
        assert_eq!(run(&["5", "0", "+", "%"]).display(), "0.5");
    }

    #[test]
    fn test_negate() {
        assert_eq!(run(&["5", "+/-"]).display(), "-5");
        assert_eq!(run(&["5", "+/-", "+/-"]).display(), "5");
        assert_eq!(run(&["+/-"]).display(), "0");
    }

    #[test]
    fn test_divide_by_zero_resets_chain() {
        let state = run(&["5", "/", "0", "="]);
        assert_eq!(state.display(), DIVIDE_BY_ZERO_TAG);
        assert_eq!(state.first_operand(), None);
        assert_eq!(state.operator(), None);
        assert!(state.is_error());
    }

    #[test]
    fn test_error_requires_clear_for_arithmetic() {
        let state = run(&["5", "/", "0", "=", "+"]);
        assert_eq!(state.display(), DIVIDE_BY_ZERO_TAG);
        assert_eq!(state.operator(), None);

        let state = run(&["5", "/", "0", "=", "C", "2", "+", "2", "="]);
        assert_eq!(state.display(), "4");
    }

    #[test]
    fn test_digit_after_error_starts_new_numeral() {
        assert_eq!(run(&["5", "/", "0", "=", "7"]).display(), "7");
    }

    #[test]
    fn test_scientific_functions() {
        assert_eq!(run(&["9", "sqrt"]).display(), "3");
        assert_eq!(run(&["3", "^"]).display(), "9");
        assert_eq!(run(&["5", "!"]).display(), "120");
        assert_eq!(run(&["1", "0", "log"]).display(), "1");
        assert_eq!(run(&["9", "0", "sin"]).display(), "1");
    }

    #[test]
    fn test_scientific_errors() {
        assert_eq!(run(&["4", "+/-", "sqrt"]).display(), ERROR_TAG);
        assert_eq!(run(&["0", "ln"]).display(), ERROR_TAG);
        assert_eq!(run(&["1", "7", "1", "!"]).display(), OVERFLOW_TAG);
        assert_eq!(run(&["5", "/", "0", "=", "sqrt"]).display(), ERROR_TAG);
    }

    #[test]
    fn test_function_keeps_pending_operator() {
        let state = run(&["5", "+", "9", "sqrt", "="]);
        assert_eq!(state.display(), "8");
    }

    #[test]
    fn test_function_sets_awaiting() {
        let state = run(&["9", "sqrt", "4"]);
        assert_eq!(state.display(), "4");
    }

    #[test]
    fn test_repeated_square_overflows() {
        let mut tokens = vec!["9"];
        tokens.extend(std::iter::repeat("^").take(9));
        assert_eq!(run(&tokens).display(), OVERFLOW_TAG);
    }

    #[test]
    fn test_memory() {
        let state = run(&["5", "M+", "AC", "3", "M+", "MR"]);
        assert_eq!(state.display(), "8");
        assert!(state.is_awaiting_next_operand());

        let state = run(&["5", "M+", "2", "M-"]);
        // "2" appends to "5" since M+ leaves the numeral open
        assert_eq!(state.memory(), 5.0 - 52.0);

        let state = run(&["5", "M+", "MC"]);
        assert_eq!(state.memory(), 0.0);
    }

    #[test]
    fn test_memory_recall_then_digit_starts_new_numeral() {
        assert_eq!(run(&["7", "M+", "MR", "1"]).display(), "1");
    }

    #[test]
    fn test_operator_after_equals_keeps_result_as_first_operand() {
        let state = run(&["5", "+", "3", "=", "7", "+", "1", "="]);
        assert_eq!(state.display(), "9");
        assert_eq!(state.first_operand(), Some(9.0));
    }

    #[test]
    fn test_digit_after_exponent_display_starts_new_numeral() {
        let state = run(&["1", "%", "%", "%", "%"]);
        assert_eq!(state.display(), "1e-8");
        assert_eq!(run(&["1", "%", "%", "%", "%", "5"]).display(), "5");
        assert_eq!(run(&["1", "%", "%", "%", "%", "."]).display(), "0.");
    }

    #[test]
    fn test_repeated_equals_keeps_result() {
        assert_eq!(run(&["5", "+", "3", "=", "="]).display(), "8");
    }

    #[test]
    fn test_clear_label() {
        assert_eq!(CalculatorState::default().clear_label(), "AC");
        assert_eq!(run(&["5"]).clear_label(), "C");
        assert_eq!(run(&["5", "C"]).clear_label(), "AC");
    }

    #[test]
    fn test_state_serialization() {
        let state = run(&["1", "2", "*"]);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"operator\":\"*\""));
        let roundtrip: CalculatorState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, roundtrip);
    }
}
