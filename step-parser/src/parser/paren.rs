use crate::{
    parser::{
        error::{kind, Error},
        expr::Expr,
        Parse,
        Parser,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parenthesized expression, such as `(1 + 2)`.
///
/// Parentheses are transparent to rule matching but are preserved in the tree so that the
/// expression displays the way it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Paren {
    /// The expression inside the parentheses.
    pub inner: Box<Expr>,

    /// The region of the source code that this expression was parsed from, including the
    /// parentheses.
    pub span: Range<usize>,
}

impl Parse for Paren {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let open = input.next_token()?;
        if open.kind != TokenKind::OpenParen {
            return Err(Error::new(vec![open.span.clone()], kind::UnexpectedToken {
                expected: &[TokenKind::OpenParen],
                found: open.kind,
            }));
        }

        if input.peek_kind() == Some(TokenKind::CloseParen) {
            let close = input.next_token()?;
            return Err(Error::new_fatal(
                vec![open.span.start..close.span.end],
                kind::EmptyParenthesis,
            ));
        }

        let inner = Expr::parse(input).map_err(Error::into_fatal)?;

        match input.next_token() {
            Ok(token) if token.kind == TokenKind::CloseParen => Ok(Self {
                span: open.span.start..token.span.end,
                inner: Box::new(inner),
            }),
            _ => Err(Error::new_fatal(
                vec![open.span.clone()],
                kind::UnclosedParenthesis { opening: true },
            )),
        }
    }
}

impl fmt::Display for Paren {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.inner)
    }
}
