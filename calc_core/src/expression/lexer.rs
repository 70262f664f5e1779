//! Tokenizer for calculator expressions.
//!
//! Numerals accept an optional fraction and exponent (`12`, `0.5`, `1e+21`).
//! Identifiers are runs of ASCII letters; `π` is read as `pi`.

use crate::errors::{CalcError, CalcResult};

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal. `integral` is false when the literal was written
    /// with a decimal point or an exponent.
    Number { value: f64, integral: bool },
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Percent,
    Bang,
    Ident(String),
}

/// A token with its byte offset in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub pos: usize,
}

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> CalcResult<Vec<Lexeme>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn run(mut self) -> CalcResult<Vec<Lexeme>> {
        let mut out = Vec::new();

        while let Some(byte) = self.peek() {
            let start = self.pos;

            if byte.is_ascii_whitespace() {
                self.pos += 1;
                continue;
            }

            let token = match byte {
                b'0'..=b'9' | b'.' => self.scan_number()?,
                b'a'..=b'z' | b'A'..=b'Z' => self.scan_ident(),
                b'+' => self.single(Token::Plus),
                b'-' => self.single(Token::Minus),
                b'*' => self.single(Token::Star),
                b'/' => self.single(Token::Slash),
                b'^' => self.single(Token::Caret),
                b'(' => self.single(Token::LParen),
                b')' => self.single(Token::RParen),
                b'%' => self.single(Token::Percent),
                b'!' => self.single(Token::Bang),
                _ => self.scan_other()?,
            };

            out.push(Lexeme { token, pos: start });
        }

        Ok(out)
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn scan_number(&mut self) -> CalcResult<Token> {
        let start = self.pos;
        let mut digits = 0usize;
        let mut integral = true;

        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
            digits += 1;
        }

        if self.peek() == Some(b'.') {
            integral = false;
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
                digits += 1;
            }
            if self.peek() == Some(b'.') {
                return Err(CalcError::syntax(self.source, self.pos, "numeral has more than one decimal point"));
            }
        }

        if digits == 0 {
            return Err(CalcError::syntax(self.source, start, "decimal point without digits"));
        }

        // Exponent only when a digit follows `e`, `e+` or `e-`; otherwise the
        // `e` belongs to the next token.
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let exponent_len = match (self.peek_at(1), self.peek_at(2)) {
                (Some(b'0'..=b'9'), _) => Some(1),
                (Some(b'+') | Some(b'-'), Some(b'0'..=b'9')) => Some(2),
                _ => None,
            };
            if let Some(len) = exponent_len {
                integral = false;
                self.pos += len;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
        }

        let text = &self.source[start..self.pos];
        let value: f64 = text
            .parse()
            .map_err(|_| CalcError::syntax(self.source, start, format!("invalid numeral '{}'", text)))?;

        Ok(Token::Number { value, integral })
    }

    fn scan_ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(b'a'..=b'z') | Some(b'A'..=b'Z')) {
            self.pos += 1;
        }
        Token::Ident(self.source[start..self.pos].to_ascii_lowercase())
    }

    fn scan_other(&mut self) -> CalcResult<Token> {
        let rest = &self.source[self.pos..];
        match rest.chars().next() {
            Some('π') => {
                self.pos += 'π'.len_utf8();
                Ok(Token::Ident("pi".to_string()))
            }
            Some('×') => {
                self.pos += '×'.len_utf8();
                Ok(Token::Star)
            }
            Some('÷') => {
                self.pos += '÷'.len_utf8();
                Ok(Token::Slash)
            }
            Some(other) => Err(CalcError::syntax(
                self.source,
                self.pos,
                format!("unexpected character '{}'", other),
            )),
            None => Err(CalcError::syntax(self.source, self.pos, "unexpected end of input")),
        }
    }
}
