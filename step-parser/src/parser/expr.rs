use crate::{
    parser::{
        binary::Binary,
        error::Error,
        literal::{LitFraction, LitInt, LitMixed},
        op::Precedence,
        paren::Paren,
        unary::Unary,
        Parse,
        Parser,
    },
    try_parse_catch_fatal,
};
use std::{fmt, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents an arithmetic expression.
///
/// An expression is a tree of integer, fraction and mixed number literals combined with binary
/// and unary operators and parentheses. The parser is the only producer of these trees; code
/// that transforms a tree always builds a new one out of parsed or cloned nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// An integer literal, such as `42`.
    Integer(LitInt),

    /// A fraction literal, such as `2/3` or `\frac{2}{3}`.
    Fraction(LitFraction),

    /// A mixed number literal, such as `1 2/3`.
    Mixed(LitMixed),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A unary operation, such as `-1`.
    Unary(Unary),

    /// A binary operation, such as `1 + 2`.
    Binary(Binary),
}

impl Expr {
    /// Returns the span of the expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Expr::Integer(int) => int.span.clone(),
            Expr::Fraction(fraction) => fraction.span.clone(),
            Expr::Mixed(mixed) => mixed.span.clone(),
            Expr::Paren(paren) => paren.span.clone(),
            Expr::Unary(unary) => unary.span.clone(),
            Expr::Binary(binary) => binary.span.clone(),
        }
    }

    /// Returns the precedence of the expression's operator, or [`None`] for atoms and
    /// parenthesized expressions.
    pub(crate) fn precedence(&self) -> Option<Precedence> {
        match self {
            Expr::Binary(binary) => Some(binary.op.precedence()),
            Expr::Unary(unary) => Some(unary.op.precedence()),
            _ => None,
        }
    }

    /// Parses a primary expression: a parenthesized expression or a literal.
    pub(crate) fn parse_primary(input: &mut Parser) -> Result<Expr, Error> {
        let _ = try_parse_catch_fatal!(input.try_parse::<Paren>().map(Expr::Paren));
        let _ = try_parse_catch_fatal!(input.try_parse::<LitMixed>().map(Expr::Mixed));
        let _ = try_parse_catch_fatal!(input.try_parse::<LitFraction>().map(Expr::Fraction));
        input.try_parse::<LitInt>().map(Expr::Integer)
    }
}

impl Parse for Expr {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let lhs = input.try_parse_with_fn(Unary::parse_or_lower)?;
        Binary::parse_expr(input, lhs, Precedence::Any)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Integer(int) => write!(f, "{}", int),
            Expr::Fraction(fraction) => write!(f, "{}", fraction),
            Expr::Mixed(mixed) => write!(f, "{}", mixed),
            Expr::Paren(paren) => write!(f, "{}", paren),
            Expr::Unary(unary) => write!(f, "{}", unary),
            Expr::Binary(binary) => write!(f, "{}", binary),
        }
    }
}
