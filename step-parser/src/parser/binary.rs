use crate::parser::{
    error::Error,
    expr::Expr,
    op::{BinOp, Precedence},
    unary::Unary,
    Parser,
};
use std::{fmt, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A binary expression, such as `1 + 2`. Binary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binary {
    /// The left-hand side of the binary expression.
    pub lhs: Box<Expr>,

    /// The operator of the binary expression.
    pub op: BinOp,

    /// The right-hand side of the binary expression.
    pub rhs: Box<Expr>,

    /// The region of the source code that this binary expression was parsed from.
    pub span: Range<usize>,
}

impl Binary {
    /// Returns the span of the binary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a sequence of binary operators with at least the given precedence, starting with
    /// `lhs` as the left-hand side of the first operator.
    pub fn parse_expr(
        input: &mut Parser,
        mut lhs: Expr,
        precedence: Precedence,
    ) -> Result<Expr, Error> {
        loop {
            // clone the input stream to emulate peeking
            let mut ahead = input.clone();
            let Ok(op) = ahead.try_parse::<BinOp>() else { break };
            if op.precedence() < precedence {
                break;
            }
            input.set_cursor(&ahead);

            let mut rhs = Unary::parse_or_lower(input)?;

            // operators that bind tighter than this one take the right-hand side first, so that
            // `1 + 2 * 3` parses as `1 + (2 * 3)`
            loop {
                let mut ahead = input.clone();
                match ahead.try_parse::<BinOp>() {
                    Ok(next_op) if next_op.precedence() > op.precedence() => {
                        rhs = Self::parse_expr(input, rhs, next_op.precedence())?;
                    },
                    _ => break,
                }
            }

            let span = lhs.span().start..rhs.span().end;
            lhs = Expr::Binary(Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // parser-produced trees never need these parentheses; they guard trees built by tree
        // surgery against changing meaning when serialized
        if self.lhs.precedence().is_some_and(|p| p < self.op.precedence()) {
            write!(f, "({})", self.lhs)?;
        } else {
            write!(f, "{}", self.lhs)?;
        }

        write!(f, " {} ", self.op)?;

        if self.rhs.precedence().is_some_and(|p| p <= self.op.precedence()) {
            write!(f, "({})", self.rhs)
        } else {
            write!(f, "{}", self.rhs)
        }
    }
}
