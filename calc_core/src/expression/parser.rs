//! Recursive-descent parser and evaluator.
//!
//! ## Grammar
//!
//! ```text
//! expr     := term (('+' | '-') term)*
//! term     := power (('*' | '/') power)*
//! power    := unary ('^' power)?            right-associative
//! unary    := ('-' | '+') unary | primary   binds tighter than '^'
//! primary  := NUMBER ['%' | '!']
//!           | '(' expr ')'
//!           | FUNC '(' expr ')'
//!           | CONST
//! FUNC     := sin | cos | tan | log | ln | sqrt
//! CONST    := pi | e
//! ```
//!
//! `N%` is the literal `N/100` and `N!` the factorial of the literal `N`.
//! Both suffixes bind only to a numeral written directly before them, so
//! `200+50%` is `200.5` and `(2+3)!` is a syntax error.

use std::f64::consts;

use serde::{Deserialize, Serialize};

use super::lexer::{tokenize, Lexeme, Token};
use crate::errors::{CalcError, CalcResult};
use crate::primitives::{factorial, operate, BinaryOp, UnaryFn};

/// Nesting limit for parentheses and unary prefixes
const MAX_DEPTH: usize = 256;

/// Named constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => consts::PI,
            Constant::E => consts::E,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl InfixOp {
    pub fn symbol(self) -> char {
        match self {
            InfixOp::Add => '+',
            InfixOp::Sub => '-',
            InfixOp::Mul => '*',
            InfixOp::Div => '/',
            InfixOp::Pow => '^',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(InfixOp::Add),
            '-' => Some(InfixOp::Sub),
            '*' => Some(InfixOp::Mul),
            '/' => Some(InfixOp::Div),
            '^' => Some(InfixOp::Pow),
            _ => None,
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    /// `N%`
    Percent(f64),
    /// `N!`
    Factorial(f64),
    Constant(Constant),
    Neg(Box<Expr>),
    Binary {
        op: InfixOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: UnaryFn,
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate the tree.
    ///
    /// Primitive failures propagate unchanged. The raw value may be
    /// non-finite; see [`super::evaluate`] for the final mapping.
    pub fn eval(&self) -> CalcResult<f64> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Percent(value) => Ok(value / 100.0),
            Expr::Factorial(value) => factorial(*value),
            Expr::Constant(constant) => Ok(constant.value()),
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval()?;
                let b = rhs.eval()?;
                match op {
                    InfixOp::Add => operate(a, BinaryOp::Add, b),
                    InfixOp::Sub => operate(a, BinaryOp::Subtract, b),
                    InfixOp::Mul => operate(a, BinaryOp::Multiply, b),
                    InfixOp::Div => operate(a, BinaryOp::Divide, b),
                    InfixOp::Pow => Ok(a.powf(b)),
                }
            }
            Expr::Call { func, arg } => func.apply(arg.eval()?),
        }
    }
}

/// Parse `source` into an expression tree.
pub fn parse(source: &str) -> CalcResult<Expr> {
    let lexemes = tokenize(source)?;
    if lexemes.is_empty() {
        return Err(CalcError::syntax(source, 0, "empty expression"));
    }

    let mut parser = Parser {
        source,
        lexemes,
        index: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;

    if let Some(extra) = parser.current() {
        let reason = match extra.token {
            Token::RParen => "unbalanced ')'",
            Token::Bang => "factorial applies only to an integer literal",
            Token::Percent => "percent applies only to a numeric literal",
            _ => "unexpected token after expression",
        };
        return Err(CalcError::syntax(source, extra.pos, reason));
    }

    Ok(expr)
}

struct Parser<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
    index: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.index)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.current().map(|l| &l.token)
    }

    fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.index).cloned();
        if lexeme.is_some() {
            self.index += 1;
        }
        lexeme
    }

    /// Byte offset of the current token, or the end of the source
    fn position(&self) -> usize {
        self.current().map(|l| l.pos).unwrap_or(self.source.len())
    }

    fn error(&self, reason: impl Into<String>) -> CalcError {
        CalcError::syntax(self.source, self.position(), reason)
    }

    fn enter(&mut self) -> CalcResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect_rparen(&mut self) -> CalcResult<()> {
        match self.peek_token() {
            Some(Token::RParen) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error("unbalanced '(' - expected ')'")),
        }
    }

    fn parse_expr(&mut self) -> CalcResult<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => InfixOp::Add,
                Some(Token::Minus) => InfixOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> CalcResult<Expr> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => InfixOp::Mul,
                Some(Token::Slash) => InfixOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_power()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_power(&mut self) -> CalcResult<Expr> {
        let base = self.parse_unary()?;
        if matches!(self.peek_token(), Some(Token::Caret)) {
            self.advance();
            self.enter()?;
            let exponent = self.parse_power();
            self.leave();
            return Ok(Expr::Binary {
                op: InfixOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent?),
            });
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> CalcResult<Expr> {
        match self.peek_token() {
            Some(Token::Minus) => {
                self.advance();
                self.enter()?;
                let inner = self.parse_unary();
                self.leave();
                Ok(Expr::Neg(Box::new(inner?)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.enter()?;
                let inner = self.parse_unary();
                self.leave();
                inner
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> CalcResult<Expr> {
        let Some(lexeme) = self.advance() else {
            return Err(self.error("expression ends with a dangling operator"));
        };

        match lexeme.token {
            Token::Number { value, integral } => self.parse_suffix(value, integral),
            Token::LParen => {
                let inner = self.parse_group()?;
                if matches!(self.peek_token(), Some(Token::Bang) | Some(Token::Percent)) {
                    return Err(self.error("suffix operators apply only to a numeric literal"));
                }
                Ok(inner)
            }
            Token::Ident(name) => {
                if let Some(func) = UnaryFn::from_call_name(&name) {
                    if !matches!(self.peek_token(), Some(Token::LParen)) {
                        return Err(self.error(format!("function '{}' requires '('", name)));
                    }
                    self.advance();
                    let arg = self.parse_group()?;
                    return Ok(Expr::Call {
                        func,
                        arg: Box::new(arg),
                    });
                }
                if let Some(constant) = Constant::from_name(&name) {
                    return Ok(Expr::Constant(constant));
                }
                Err(CalcError::syntax(
                    self.source,
                    lexeme.pos,
                    format!("unknown name '{}'", name),
                ))
            }
            Token::RParen => Err(CalcError::syntax(self.source, lexeme.pos, "empty sub-expression")),
            _ => Err(CalcError::syntax(self.source, lexeme.pos, "expected a number, '(' or function")),
        }
    }

    /// Parse the body of a group whose `(` has been consumed
    fn parse_group(&mut self) -> CalcResult<Expr> {
        self.enter()?;
        let inner = self.parse_expr();
        self.leave();
        let inner = inner?;
        self.expect_rparen()?;
        Ok(inner)
    }

    fn parse_suffix(&mut self, value: f64, integral: bool) -> CalcResult<Expr> {
        match self.peek_token() {
            Some(Token::Percent) => {
                self.advance();
                Ok(Expr::Percent(value))
            }
            Some(Token::Bang) => {
                if !integral {
                    return Err(self.error("factorial applies only to an integer literal"));
                }
                self.advance();
                Ok(Expr::Factorial(value))
            }
            _ => Ok(Expr::Number(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> CalcResult<f64> {
        parse(source)?.eval()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4").unwrap(), 14.0);
        assert_eq!(eval("(2+3)*4").unwrap(), 20.0);
        assert_eq!(eval("10-4-3").unwrap(), 3.0);
        assert_eq!(eval("16/4/2").unwrap(), 2.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2^3^2").unwrap(), 512.0);
        assert_eq!(eval("2*3^2").unwrap(), 18.0);
        assert_eq!(eval("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn test_unary_minus_binds_tighter_than_power() {
        assert_eq!(eval("-2^2").unwrap(), 4.0);
        assert_eq!(eval("-(2+3)").unwrap(), -5.0);
        assert_eq!(eval("3--2").unwrap(), 5.0);
    }

    #[test]
    fn test_percent_is_local() {
        assert_eq!(eval("50%").unwrap(), 0.5);
        assert_eq!(eval("200+50%").unwrap(), 200.5);
        assert!(parse("(50)%").is_err());
    }

    #[test]
    fn test_factorial_literal_only() {
        assert_eq!(eval("5!").unwrap(), 120.0);
        assert_eq!(eval("3!+1").unwrap(), 7.0);
        assert!(matches!(parse("(2+3)!"), Err(CalcError::SyntaxError { .. })));
        assert!(matches!(parse("2.5!"), Err(CalcError::SyntaxError { .. })));
        assert!(matches!(parse("5!!"), Err(CalcError::SyntaxError { .. })));
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((eval("sin(30)").unwrap() - 0.5).abs() < 1e-12);
        assert!((eval("log(1000)").unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(eval("sqrt(9)+1").unwrap(), 4.0);
        assert!((eval("ln(e)").unwrap() - 1.0).abs() < 1e-12);
        assert!((eval("2*pi").unwrap() - 2.0 * consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_tree_shape() {
        assert_eq!(
            parse("-1+2").unwrap(),
            Expr::Binary {
                op: InfixOp::Add,
                lhs: Box::new(Expr::Neg(Box::new(Expr::Number(1.0)))),
                rhs: Box::new(Expr::Number(2.0)),
            }
        );
    }

    #[test]
    fn test_malformed_input() {
        for source in ["", "2+", "(2+3", "2+3)", "()", "*2", "sin 30", "foo(1)", "2 3", "sin()"] {
            assert!(
                matches!(parse(source), Err(CalcError::SyntaxError { .. })),
                "expected syntax error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&deep), Err(CalcError::SyntaxError { .. })));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval(&shallow).unwrap(), 1.0);
    }
}
