//! Keyboard maps for the two calculators.
//!
//! A line of input is split on whitespace. A word that names a key as a
//! whole (`Enter`, `sqrt`, `M+`, `+/-`) is that key; anything else is read
//! character by character, with letter runs tried as function names first,
//! so `12+3=` and `sqrt(9)=` both work.

use anyhow::{bail, Result};
use calc_core::expression::{Constant, ExprKey};
use calc_core::primitives::UnaryFn;
use calc_core::Token;

/// Keyboard map of the standard (accumulator) calculator
pub fn standard_key(name: &str) -> Option<Token> {
    let token = match name {
        "Enter" | "=" => Token::Equals,
        "Backspace" | "Delete" | "c" | "C" => Token::Clear,
        "s" => Token::Function(UnaryFn::Sin),
        "o" => Token::Function(UnaryFn::Cos),
        "t" => Token::Function(UnaryFn::Tan),
        "l" => Token::Function(UnaryFn::Log),
        "n" => Token::Function(UnaryFn::Ln),
        "q" => Token::Function(UnaryFn::Sqrt),
        "f" => Token::Function(UnaryFn::Factorial),
        "p" => Token::Negate,
        other => return other.parse().ok(),
    };
    Some(token)
}

/// Keyboard map of the expression calculator
pub fn expression_key(name: &str) -> Option<ExprKey> {
    let key = match name {
        "Enter" => ExprKey::Equals,
        "Backspace" => ExprKey::Backspace,
        "Delete" => ExprKey::Clear,
        "p" | "P" => ExprKey::Constant(Constant::Pi),
        "e" | "E" => ExprKey::Constant(Constant::E),
        other => return other.parse().ok(),
    };
    Some(key)
}

/// Split a line of input into keys using `map`.
pub fn expand_keys<K>(line: &str, map: impl Fn(&str) -> Option<K>) -> Result<Vec<K>> {
    let mut keys = Vec::new();
    for word in line.split_whitespace() {
        match map(word) {
            Some(key) => keys.push(key),
            None => expand_word(word, &map, &mut keys)?,
        }
    }
    Ok(keys)
}

fn expand_word<K>(word: &str, map: &impl Fn(&str) -> Option<K>, keys: &mut Vec<K>) -> Result<()> {
    let chars: Vec<char> = word.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let run: String = chars[start..i].iter().collect();

            // `sqrt(` is one key in the expression calculator
            if chars.get(i) == Some(&'(') {
                if let Some(key) = map(&format!("{}(", run)) {
                    keys.push(key);
                    i += 1;
                    continue;
                }
            }
            if let Some(key) = map(&run) {
                keys.push(key);
                continue;
            }
            for letter in run.chars() {
                keys.push(single(letter, map, word)?);
            }
        } else {
            keys.push(single(chars[i], map, word)?);
            i += 1;
        }
    }
    Ok(())
}

fn single<K>(c: char, map: &impl Fn(&str) -> Option<K>, word: &str) -> Result<K> {
    match map(c.encode_utf8(&mut [0; 4])) {
        Some(key) => Ok(key),
        None => bail!("unknown key '{}' in '{}'", c, word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::expression::InfixOp;
    use calc_core::primitives::BinaryOp;

    #[test]
    fn test_standard_keymap() {
        assert_eq!(standard_key("Enter"), Some(Token::Equals));
        assert_eq!(standard_key("Delete"), Some(Token::Clear));
        assert_eq!(standard_key("q"), Some(Token::Function(UnaryFn::Sqrt)));
        assert_eq!(standard_key("f"), Some(Token::Function(UnaryFn::Factorial)));
        assert_eq!(standard_key("^"), Some(Token::Function(UnaryFn::Square)));
        assert_eq!(standard_key("p"), Some(Token::Negate));
        assert_eq!(standard_key("7"), Some(Token::Digit(7)));
        assert_eq!(standard_key("z"), None);
    }

    #[test]
    fn test_expression_keymap() {
        assert_eq!(expression_key("Enter"), Some(ExprKey::Equals));
        assert_eq!(expression_key("Backspace"), Some(ExprKey::Backspace));
        assert_eq!(expression_key("Delete"), Some(ExprKey::Clear));
        assert_eq!(expression_key("p"), Some(ExprKey::Constant(Constant::Pi)));
        assert_eq!(expression_key("^"), Some(ExprKey::Operator(InfixOp::Pow)));
        assert_eq!(expression_key("("), Some(ExprKey::OpenParen));
    }

    #[test]
    fn test_expand_standard_line() {
        let keys = expand_keys("12+3 =", standard_key).unwrap();
        assert_eq!(
            keys,
            vec![
                Token::Digit(1),
                Token::Digit(2),
                Token::Operator(BinaryOp::Add),
                Token::Digit(3),
                Token::Equals,
            ]
        );

        let keys = expand_keys("9 sqrt M+ +/-", standard_key).unwrap();
        assert_eq!(
            keys,
            vec![
                Token::Digit(9),
                Token::Function(UnaryFn::Sqrt),
                Token::MemoryAdd,
                Token::Negate,
            ]
        );
    }

    #[test]
    fn test_expand_expression_line() {
        let keys = expand_keys("sqrt(9)+2=", expression_key).unwrap();
        assert_eq!(
            keys,
            vec![
                ExprKey::Function(UnaryFn::Sqrt),
                ExprKey::Digit(9),
                ExprKey::CloseParen,
                ExprKey::Operator(InfixOp::Add),
                ExprKey::Digit(2),
                ExprKey::Equals,
            ]
        );

        let keys = expand_keys("2pe", expression_key).unwrap();
        assert_eq!(
            keys,
            vec![
                ExprKey::Digit(2),
                ExprKey::Constant(Constant::Pi),
                ExprKey::Constant(Constant::E),
            ]
        );
    }

    #[test]
    fn test_unknown_key() {
        assert!(expand_keys("2 # 3", standard_key).is_err());
        assert!(expand_keys("xyz", expression_key).is_err());
    }
}
