use ariadne::Fmt;
use step_attrs::ErrorKind;
use step_error::{ErrorKind, EXPR};
use crate::tokenizer::TokenKind;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of file",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of file",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    labels = [format!("expected one of: {}", expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", "))],
    help = format!("found {:?}", found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A fraction was written with a denominator of zero.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "fraction with a denominator of zero",
    labels = ["this denominator is zero"],
    help = format!("the denominator of a fraction must be a {} integer", "non-zero".fg(EXPR)),
)]
pub struct ZeroDenominator;

/// A decimal literal was used outside of a mixed decimal / fraction expression.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "decimal literal outside of a fraction expression",
    labels = ["this decimal literal"],
    help = format!(
        "decimal literals are only converted to fractions when the expression also contains {} syntax, such as `1/2` or `\\frac{{1}}{{2}}`",
        "fraction".fg(EXPR),
    ),
)]
pub struct DecimalOutsideFraction;

/// A parenthesis was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed parenthesis",
    labels = ["this parenthesis is not closed"],
    help = if *opening {
        "add a closing parenthesis `)` somewhere after this"
    } else {
        "add an opening parenthesis `(` somewhere before this"
    },
)]
pub struct UnclosedParenthesis {
    /// Whether the parenthesis was an opening parenthesis `(`. Otherwise, the parenthesis was a
    /// closing parenthesis `)`.
    pub opening: bool,
}

/// There was no expression inside a pair of parentheses.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing expression inside parenthesis",
    labels = ["add an expression here"],
)]
pub struct EmptyParenthesis;
