//! Structural predicates for invariant rules.
//!
//! A predicate is a closed description of a tree shape, evaluated by exhaustive matching over
//! the expression node variants. Evaluation is total: it never panics and simply returns false
//! when the node's shape does not fit.
//!
//! Predicates match the node they are given directly; they do not look through parentheses at
//! the top level (the tree walk already visits the grouped expression itself), but *operands*
//! are read through parentheses and unary sign operators.

use crate::primitive::int_from_str;
use crate::tree::{as_fraction, as_integer};
use step_parser::parser::{expr::Expr, op::BinOpKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A structural predicate describing when a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Predicate {
    /// A binary window whose operands are both integer literals. Division additionally
    /// requires a non-zero divisor.
    IntegerWindow { op: BinOpKind },

    /// A binary window whose operands are fractions with literally equal denominators.
    ///
    /// Denominators are compared as the strings they were written as: `2/4` and `1/2` do not
    /// share a denominator, and neither do `1/2` and `2/04`.
    SameDenominatorWindow { op: BinOpKind },

    /// A binary window whose operands are fractions with literally different denominators.
    UnequalDenominatorWindow { op: BinOpKind },

    /// A binary window whose operands are both fractions, with any denominators.
    FractionWindow { op: BinOpKind },

    /// A binary window with one integer operand and one fraction operand, under any operator.
    MixedTypeWindow,

    /// A mixed number literal.
    MixedNumber,

    /// A fraction that can be reduced: a common factor in numerator and denominator, or a
    /// denominator of one.
    ReducibleFraction,
}

impl Predicate {
    /// Evaluates the predicate against a node of the tree.
    pub fn matches(&self, node: &Expr) -> bool {
        match self {
            Predicate::IntegerWindow { op } => binary_window(node, *op, |lhs, rhs| {
                match (as_integer(lhs), as_integer(rhs)) {
                    (Some(_), Some(divisor)) if *op == BinOpKind::Div => divisor != 0,
                    (Some(_), Some(_)) => true,
                    _ => false,
                }
            }),
            Predicate::SameDenominatorWindow { op } => binary_window(node, *op, |lhs, rhs| {
                match (as_fraction(lhs), as_fraction(rhs)) {
                    (Some(lhs), Some(rhs)) => lhs.denominator == rhs.denominator,
                    _ => false,
                }
            }),
            Predicate::UnequalDenominatorWindow { op } => binary_window(node, *op, |lhs, rhs| {
                match (as_fraction(lhs), as_fraction(rhs)) {
                    (Some(lhs), Some(rhs)) => lhs.denominator != rhs.denominator,
                    _ => false,
                }
            }),
            Predicate::FractionWindow { op } => binary_window(node, *op, |lhs, rhs| {
                as_fraction(lhs).is_some() && as_fraction(rhs).is_some()
            }),
            Predicate::MixedTypeWindow => match node {
                Expr::Binary(binary) => {
                    (as_integer(&binary.lhs).is_some() && as_fraction(&binary.rhs).is_some())
                        || (as_fraction(&binary.lhs).is_some() && as_integer(&binary.rhs).is_some())
                },
                _ => false,
            },
            Predicate::MixedNumber => matches!(node, Expr::Mixed(_)),
            Predicate::ReducibleFraction => match node {
                Expr::Fraction(fraction) => {
                    if fraction.denominator == "1" {
                        return true;
                    }
                    let numerator = int_from_str(&fraction.numerator);
                    let denominator = int_from_str(&fraction.denominator);
                    numerator.gcd(&denominator) > 1
                },
                _ => false,
            },
        }
    }
}

/// Matches a binary node with the given operator whose operands satisfy the given check.
fn binary_window(node: &Expr, op: BinOpKind, operands: impl Fn(&Expr, &Expr) -> bool) -> bool {
    match node {
        Expr::Binary(binary) if binary.op.kind == op => operands(&binary.lhs, &binary.rhs),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use step_parser::parser::Parser;

    fn parse(source: &str) -> Expr {
        Parser::new(source).try_parse_full::<Expr>().unwrap()
    }

    #[test]
    fn same_denominator_is_literal() {
        let same = parse("1/4 + 2/4");
        let equivalent_but_different = parse("2/4 + 1/2");

        assert!(Predicate::SameDenominatorWindow { op: BinOpKind::Add }.matches(&same));
        // `2/4` and `1/2` are numerically compatible, but matching compares the written literals
        assert!(!Predicate::SameDenominatorWindow { op: BinOpKind::Add }.matches(&equivalent_but_different));
        assert!(Predicate::UnequalDenominatorWindow { op: BinOpKind::Add }.matches(&equivalent_but_different));
    }

    #[test]
    fn signed_operands_still_match() {
        let window = parse("-1/3 + 2/3");
        assert!(Predicate::SameDenominatorWindow { op: BinOpKind::Add }.matches(&window));
    }

    #[test]
    fn mixed_type_window() {
        assert!(Predicate::MixedTypeWindow.matches(&parse("3 + 2/5")));
        assert!(Predicate::MixedTypeWindow.matches(&parse("2/5 * 3")));
        assert!(!Predicate::MixedTypeWindow.matches(&parse("3 + 4")));
        assert!(!Predicate::MixedTypeWindow.matches(&parse("1/5 + 2/5")));
    }

    #[test]
    fn integer_division_by_zero_never_matches() {
        let window = parse("(6) / 0");
        assert!(!Predicate::IntegerWindow { op: BinOpKind::Div }.matches(&window));
        let fine = parse("(6) / 2");
        assert!(Predicate::IntegerWindow { op: BinOpKind::Div }.matches(&fine));
    }

    #[test]
    fn reducible_fractions() {
        assert!(Predicate::ReducibleFraction.matches(&parse("4/8")));
        assert!(Predicate::ReducibleFraction.matches(&parse("3/3")));
        assert!(Predicate::ReducibleFraction.matches(&parse("5/1")));
        assert!(!Predicate::ReducibleFraction.matches(&parse("2/5")));
    }
}
