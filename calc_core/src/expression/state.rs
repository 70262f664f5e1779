//! Key-driven state for the expression calculator.
//!
//! [`ExpressionState`] owns the expression text, the last result, the memory
//! register and the fresh-mode flag. Each key press mutates it in place.
//!
//! ## Fresh mode
//!
//! After `=` the next key decides how the new entry starts:
//!
//! | Next key | Effect on the text |
//! |----------|--------------------|
//! | digit, `(`, `)`, function, constant, `.` | start from empty (`.` becomes `0.`) |
//! | `+ - * / ^ % !` | chain from the numeric result, or start empty after an error |
//! | `=`, `C`, backspace, memory keys | no change |
//!
//! ```rust
//! use calc_core::expression::{ExprKey, ExpressionState};
//!
//! let mut state = ExpressionState::new();
//! for key in ["5", "+", "3", "=", "*", "2", "="] {
//!     state.press(key.parse::<ExprKey>().unwrap());
//! }
//! assert_eq!(state.result_text(), "16");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parser::{Constant, InfixOp};
use super::{display_tag, evaluate};
use crate::errors::{CalcError, CalcResult};
use crate::format::format_number;
use crate::primitives::UnaryFn;

/// A key of the expression calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExprKey {
    Digit(u8),
    Point,
    Operator(InfixOp),
    OpenParen,
    CloseParen,
    Percent,
    Factorial,
    /// Appends `name(`
    Function(UnaryFn),
    Constant(Constant),
    Equals,
    Clear,
    Backspace,
    MemoryClear,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
}

impl ExprKey {
    /// Text appended to the expression, for keys that append
    fn text(self) -> Option<String> {
        match self {
            ExprKey::Digit(d) => Some(char::from(b'0' + d).to_string()),
            ExprKey::Operator(op) => Some(op.symbol().to_string()),
            ExprKey::OpenParen => Some("(".to_string()),
            ExprKey::CloseParen => Some(")".to_string()),
            ExprKey::Percent => Some("%".to_string()),
            ExprKey::Factorial => Some("!".to_string()),
            ExprKey::Function(func) => Some(format!("{}(", func.name())),
            ExprKey::Constant(Constant::Pi) => Some("π".to_string()),
            ExprKey::Constant(Constant::E) => Some("e".to_string()),
            _ => None,
        }
    }
}

impl FromStr for ExprKey {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "." => ExprKey::Point,
            "(" => ExprKey::OpenParen,
            ")" => ExprKey::CloseParen,
            "%" => ExprKey::Percent,
            "!" => ExprKey::Factorial,
            "=" => ExprKey::Equals,
            "C" | "AC" => ExprKey::Clear,
            "backspace" => ExprKey::Backspace,
            "MC" => ExprKey::MemoryClear,
            "M+" => ExprKey::MemoryAdd,
            "M-" => ExprKey::MemorySubtract,
            "MR" => ExprKey::MemoryRecall,
            "pi" | "π" => ExprKey::Constant(Constant::Pi),
            "e" => ExprKey::Constant(Constant::E),
            _ => parse_input_key(s)?,
        };
        Ok(key)
    }
}

/// Digits, operators and function names
fn parse_input_key(s: &str) -> CalcResult<ExprKey> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(digit) = c.to_digit(10) {
            return Ok(ExprKey::Digit(digit as u8));
        }
        if let Some(op) = InfixOp::from_symbol(c) {
            return Ok(ExprKey::Operator(op));
        }
    }

    let name = s.strip_suffix('(').unwrap_or(s);
    UnaryFn::from_call_name(name)
        .map(ExprKey::Function)
        .ok_or_else(|| CalcError::invalid_input("key", s, "unknown expression key"))
}

impl fmt::Display for ExprKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKey::Point => write!(f, "."),
            ExprKey::Equals => write!(f, "="),
            ExprKey::Clear => write!(f, "C"),
            ExprKey::Backspace => write!(f, "backspace"),
            ExprKey::MemoryClear => write!(f, "MC"),
            ExprKey::MemoryAdd => write!(f, "M+"),
            ExprKey::MemorySubtract => write!(f, "M-"),
            ExprKey::MemoryRecall => write!(f, "MR"),
            other => write!(f, "{}", other.text().unwrap_or_default()),
        }
    }
}

/// How a key leaves fresh mode
enum FreshEntry {
    StartEmpty,
    ChainResult,
    Keep,
}

fn fresh_entry(key: ExprKey) -> FreshEntry {
    match key {
        ExprKey::Digit(_)
        | ExprKey::Point
        | ExprKey::OpenParen
        | ExprKey::CloseParen
        | ExprKey::Function(_)
        | ExprKey::Constant(_) => FreshEntry::StartEmpty,
        ExprKey::Operator(_) | ExprKey::Percent | ExprKey::Factorial => FreshEntry::ChainResult,
        _ => FreshEntry::Keep,
    }
}

/// State of the expression calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionState {
    text: String,
    result: CalcResult<f64>,
    memory: f64,
    fresh: bool,
    last_expression: Option<String>,
}

impl Default for ExpressionState {
    fn default() -> Self {
        ExpressionState {
            text: String::new(),
            result: Ok(0.0),
            memory: 0.0,
            fresh: false,
            last_expression: None,
        }
    }
}

impl ExpressionState {
    /// Create a calculator with an empty expression and a zeroed memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The expression being built
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The displayed result
    pub fn result(&self) -> &CalcResult<f64> {
        &self.result
    }

    /// The displayed result as text (`Error` / `Division by Zero` on failure)
    pub fn result_text(&self) -> String {
        match &self.result {
            Ok(value) => format_number(*value),
            Err(error) => display_tag(error).to_string(),
        }
    }

    /// Memory register
    pub fn memory(&self) -> f64 {
        self.memory
    }

    /// True right after `=`
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// The last evaluated expression followed by `=`
    pub fn last_expression(&self) -> Option<&str> {
        self.last_expression.as_deref()
    }

    /// Apply one key.
    ///
    /// Memory keys return the register value after the operation.
    pub fn press(&mut self, key: ExprKey) -> Option<f64> {
        if self.fresh {
            self.leave_fresh(key);
        }

        let memory = match key {
            ExprKey::Clear => {
                self.clear();
                None
            }
            ExprKey::Backspace => {
                self.backspace();
                None
            }
            ExprKey::Equals => {
                self.equals();
                None
            }
            ExprKey::MemoryClear => {
                self.memory = 0.0;
                Some(self.memory)
            }
            ExprKey::MemoryAdd => {
                if let Ok(value) = self.result {
                    self.memory += value;
                }
                Some(self.memory)
            }
            ExprKey::MemorySubtract => {
                if let Ok(value) = self.result {
                    self.memory -= value;
                }
                Some(self.memory)
            }
            ExprKey::MemoryRecall => {
                self.text = format_number(self.memory);
                self.result = Ok(self.memory);
                self.fresh = false;
                Some(self.memory)
            }
            _ => {
                self.append_token(key);
                None
            }
        };

        if self.text.is_empty() && !self.fresh {
            self.result = Ok(0.0);
        }

        debug!(key = %key, text = %self.text, fresh = self.fresh, "expression key");
        memory
    }

    fn leave_fresh(&mut self, key: ExprKey) {
        match fresh_entry(key) {
            FreshEntry::StartEmpty => {
                self.text.clear();
                self.fresh = false;
            }
            FreshEntry::ChainResult => {
                self.text = match self.result {
                    Ok(value) => format_number(value),
                    Err(_) => String::new(),
                };
                if self.result.is_err() {
                    self.result = Ok(0.0);
                }
                self.fresh = false;
            }
            FreshEntry::Keep => {}
        }
    }

    /// Reset the expression and result. Memory is kept.
    pub fn clear(&mut self) {
        self.text.clear();
        self.result = Ok(0.0);
        self.fresh = false;
    }

    /// Remove the last character of the expression.
    ///
    /// Editing clears an error result; an emptied expression shows `0`.
    pub fn backspace(&mut self) {
        self.text.pop();
        if self.text.is_empty() || self.result.is_err() {
            self.result = Ok(0.0);
        }
        self.fresh = false;
    }

    /// Append the text of an input key.
    ///
    /// A decimal point is accepted at most once per numeral; where no digit
    /// precedes it (start of text, after an operator or `(`) it is written as
    /// `0.`. Keys that do not append text are ignored.
    pub fn append_token(&mut self, key: ExprKey) {
        if self.result.is_err() {
            self.text.clear();
            self.result = Ok(0.0);
        }

        if key == ExprKey::Point {
            self.append_point();
        } else if let Some(text) = key.text() {
            self.text.push_str(&text);
        }
        self.fresh = false;
    }

    fn append_point(&mut self) {
        match self.text.chars().last() {
            None => self.text.push_str("0."),
            Some(c) if c.is_ascii_digit() => {
                if !trailing_numeral_has_point(&self.text) {
                    self.text.push('.');
                }
            }
            Some('+' | '-' | '*' | '/' | '^' | '(') => self.text.push_str("0."),
            Some(_) => {}
        }
    }

    /// Evaluate the expression.
    ///
    /// On success the text becomes the formatted result so an operator can
    /// chain from it; on failure the invalid expression stays in place.
    pub fn equals(&mut self) -> &CalcResult<f64> {
        if self.text.is_empty() {
            self.result = Ok(0.0);
            return &self.result;
        }

        let outcome = evaluate(&self.text);
        self.last_expression = Some(format!("{}=", self.text));
        if let Ok(value) = outcome {
            self.text = format_number(value);
        }
        self.result = outcome;
        self.fresh = true;
        &self.result
    }
}

fn trailing_numeral_has_point(text: &str) -> bool {
    text.chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .any(|c| c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(state: &mut ExpressionState, keys: &[&str]) {
        for key in keys {
            state.press(key.parse().unwrap());
        }
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("7".parse::<ExprKey>().unwrap(), ExprKey::Digit(7));
        assert_eq!("^".parse::<ExprKey>().unwrap(), ExprKey::Operator(InfixOp::Pow));
        assert_eq!("sin(".parse::<ExprKey>().unwrap(), ExprKey::Function(UnaryFn::Sin));
        assert_eq!("sqrt".parse::<ExprKey>().unwrap(), ExprKey::Function(UnaryFn::Sqrt));
        assert!("foo".parse::<ExprKey>().is_err());
    }

    #[test]
    fn test_build_and_evaluate() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["2", "+", "3", "*", "4"]);
        assert_eq!(state.text(), "2+3*4");
        state.press(ExprKey::Equals);
        assert_eq!(state.result_text(), "14");
        assert_eq!(state.last_expression(), Some("2+3*4="));
        assert!(state.is_fresh());
    }

    #[test]
    fn test_functions_emit_open_paren() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["sqrt", "1", "6", ")", "="]);
        assert_eq!(state.result_text(), "4");
    }

    #[test]
    fn test_fresh_digit_starts_new_expression() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["5", "+", "3", "=", "7"]);
        assert_eq!(state.text(), "7");
    }

    #[test]
    fn test_fresh_operator_chains_result() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["5", "+", "3", "=", "*", "2"]);
        assert_eq!(state.text(), "8*2");
    }

    #[test]
    fn test_fresh_operator_after_error_starts_empty() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["1", "/", "0", "="]);
        assert_eq!(state.result_text(), "Division by Zero");
        assert_eq!(state.text(), "1/0");
        press_all(&mut state, &["-", "4"]);
        assert_eq!(state.text(), "-4");
    }

    #[test]
    fn test_fresh_point_prepends_zero() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["5", "=", ".", "5"]);
        assert_eq!(state.text(), "0.5");
    }

    #[test]
    fn test_single_point_per_numeral() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["1", ".", "2", ".", "3", "+", ".", "5", "."]);
        assert_eq!(state.text(), "1.23+0.5");
    }

    #[test]
    fn test_backspace() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["1", "2"]);
        state.press(ExprKey::Backspace);
        assert_eq!(state.text(), "1");
        state.press(ExprKey::Backspace);
        assert_eq!(state.text(), "");
        assert_eq!(state.result_text(), "0");
    }

    #[test]
    fn test_syntax_error_keeps_expression() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["2", "+", "="]);
        assert_eq!(state.result_text(), "Error");
        assert_eq!(state.text(), "2+");
        state.press(ExprKey::Backspace);
        assert_eq!(state.text(), "2");
        assert_eq!(state.result_text(), "0");
    }

    #[test]
    fn test_memory_uses_displayed_result() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["6", "*", "7", "="]);
        assert_eq!(state.press(ExprKey::MemoryAdd), Some(42.0));
        press_all(&mut state, &["2", "="]);
        assert_eq!(state.press(ExprKey::MemorySubtract), Some(40.0));
        state.press(ExprKey::Clear);
        assert_eq!(state.press(ExprKey::MemoryRecall), Some(40.0));
        assert_eq!(state.text(), "40");
        assert_eq!(state.result_text(), "40");
        assert_eq!(state.press(ExprKey::MemoryClear), Some(0.0));
        assert_eq!(state.memory(), 0.0);
    }

    #[test]
    fn test_memory_ignores_error_result() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["1", "/", "0", "="]);
        assert_eq!(state.press(ExprKey::MemoryAdd), Some(0.0));
    }

    #[test]
    fn test_equals_on_empty_shows_zero() {
        let mut state = ExpressionState::new();
        state.press(ExprKey::Equals);
        assert_eq!(state.result_text(), "0");
        assert!(!state.is_fresh());
    }

    #[test]
    fn test_clear_keeps_memory() {
        let mut state = ExpressionState::new();
        press_all(&mut state, &["9", "=", "M+", "C"]);
        assert_eq!(state.text(), "");
        assert_eq!(state.result_text(), "0");
        assert_eq!(state.memory(), 9.0);
    }

    #[test]
    fn test_instances_do_not_share_memory() {
        let mut a = ExpressionState::new();
        let b = ExpressionState::new();
        press_all(&mut a, &["3", "=", "M+"]);
        assert_eq!(a.memory(), 3.0);
        assert_eq!(b.memory(), 0.0);
    }
}
