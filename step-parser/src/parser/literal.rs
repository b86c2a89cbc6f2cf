//! Literal expression nodes: integers, fractions and mixed numbers.
//!
//! Literal values are stored as the strings they were written as. This keeps the tree faithful
//! to the source text and makes "literal denominator equality" a plain string comparison;
//! consumers parse the strings into integers when they need to do arithmetic.

use crate::{
    parser::{
        error::{kind, Error},
        Parse,
        Parser,
    },
    tokenizer::{Token, TokenKind},
    try_parse_catch_fatal,
};
use rug::{ops::Pow, Integer};
use std::{fmt, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parses a single token of the given kind, skipping whitespace.
fn expect_token<'source>(
    input: &mut Parser<'source>,
    want: TokenKind,
    expected: &'static [TokenKind],
) -> Result<Token<'source>, Error> {
    let token = input.next_token()?;
    if token.kind == want {
        Ok(token)
    } else {
        Err(Error::new(vec![token.span.clone()], kind::UnexpectedToken {
            expected,
            found: token.kind,
        }))
    }
}

/// Returns a fatal error if the given denominator token is the literal zero.
fn check_denominator(denominator: &Token) -> Result<(), Error> {
    if denominator.lexeme.chars().all(|c| c == '0') {
        Err(Error::new_fatal(vec![denominator.span.clone()], kind::ZeroDenominator))
    } else {
        Ok(())
    }
}

/// An integer literal, represented as a [`String`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitInt {
    /// The value of the integer literal as a string.
    pub value: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitInt {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = expect_token(input, TokenKind::Int, &[TokenKind::Int])?;
        Ok(Self {
            value: token.lexeme.to_owned(),
            span: token.span,
        })
    }
}

impl fmt::Display for LitInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A fraction literal, such as `2/3` or `\frac{2}{3}`, with numerator and denominator
/// represented as [`String`]s.
///
/// A decimal literal such as `0.75` also parses into this node, normalized to its lowest-terms
/// fraction, but only when the surrounding source contains fraction syntax; see
/// [`Parser::fraction_context`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitFraction {
    /// The numerator of the fraction as a string.
    pub numerator: String,

    /// The denominator of the fraction as a string. Never the literal zero.
    pub denominator: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl LitFraction {
    /// Parses a fraction written as `a/b`.
    fn parse_slash(input: &mut Parser) -> Result<Self, Error> {
        let numerator = expect_token(input, TokenKind::Int, &[TokenKind::Int])?;
        expect_token(input, TokenKind::Div, &[TokenKind::Div])?;
        let denominator = expect_token(input, TokenKind::Int, &[TokenKind::Int])?;
        check_denominator(&denominator)?;

        Ok(Self {
            numerator: numerator.lexeme.to_owned(),
            denominator: denominator.lexeme.to_owned(),
            span: numerator.span.start..denominator.span.end,
        })
    }

    /// Parses a fraction written as `\frac{a}{b}`. Once the `\frac` token is seen, the braces
    /// and operands are required, so any error past that point is fatal.
    fn parse_latex(input: &mut Parser) -> Result<Self, Error> {
        let frac = expect_token(input, TokenKind::Frac, &[TokenKind::Frac])?;

        expect_token(input, TokenKind::OpenBrace, &[TokenKind::OpenBrace])
            .map_err(Error::into_fatal)?;
        let numerator = expect_token(input, TokenKind::Int, &[TokenKind::Int])
            .map_err(Error::into_fatal)?;
        expect_token(input, TokenKind::CloseBrace, &[TokenKind::CloseBrace])
            .map_err(Error::into_fatal)?;

        expect_token(input, TokenKind::OpenBrace, &[TokenKind::OpenBrace])
            .map_err(Error::into_fatal)?;
        let denominator = expect_token(input, TokenKind::Int, &[TokenKind::Int])
            .map_err(Error::into_fatal)?;
        let close = expect_token(input, TokenKind::CloseBrace, &[TokenKind::CloseBrace])
            .map_err(Error::into_fatal)?;
        check_denominator(&denominator)?;

        Ok(Self {
            numerator: numerator.lexeme.to_owned(),
            denominator: denominator.lexeme.to_owned(),
            span: frac.span.start..close.span.end,
        })
    }

    /// Parses a decimal literal into its lowest-terms fraction. Decimals are only accepted when
    /// the surrounding source contains fraction syntax; anywhere else they are a fatal error.
    fn parse_decimal(input: &mut Parser) -> Result<Self, Error> {
        let token = expect_token(input, TokenKind::Float, &[TokenKind::Float])?;
        if !input.fraction_context() {
            return Err(Error::new_fatal(vec![token.span.clone()], kind::DecimalOutsideFraction));
        }

        // the lexer guarantees the shape `[0-9]+.[0-9]+`
        let (int_part, frac_part) = token.lexeme.split_once('.').unwrap();
        let numerator = Integer::from_str_radix(&format!("{}{}", int_part, frac_part), 10).unwrap();
        let ten = Integer::from(10);
        let denominator = Integer::from((&ten).pow(frac_part.len() as u32));

        let gcd = numerator.clone().gcd(&denominator);
        Ok(Self {
            numerator: (numerator / &gcd).to_string(),
            denominator: (denominator / &gcd).to_string(),
            span: token.span,
        })
    }

    /// Parses a fraction written as `a/b` or `\frac{a}{b}`, but not as a decimal literal. Mixed
    /// numbers use this form for their fraction part.
    pub fn parse_simple(input: &mut Parser) -> Result<Self, Error> {
        let _ = try_parse_catch_fatal!(input.try_parse_with_fn(Self::parse_slash));
        input.try_parse_with_fn(Self::parse_latex)
    }
}

impl Parse for LitFraction {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let _ = try_parse_catch_fatal!(input.try_parse_with_fn(Self::parse_simple));
        input.try_parse_with_fn(Self::parse_decimal)
    }
}

impl fmt::Display for LitFraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A mixed number literal, a whole number followed by an adjacent fraction, such as `1 2/3`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitMixed {
    /// The whole part of the mixed number as a string.
    pub whole: String,

    /// The numerator of the fraction part as a string.
    pub numerator: String,

    /// The denominator of the fraction part as a string. Never the literal zero.
    pub denominator: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitMixed {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let whole = expect_token(input, TokenKind::Int, &[TokenKind::Int])?;
        let fraction = LitFraction::parse_simple(input)?;

        Ok(Self {
            whole: whole.lexeme.to_owned(),
            numerator: fraction.numerator,
            denominator: fraction.denominator,
            span: whole.span.start..fraction.span.end,
        })
    }
}

impl fmt::Display for LitMixed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}/{}", self.whole, self.numerator, self.denominator)
    }
}
