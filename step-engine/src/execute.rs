//! Primitive executors: the pure transformations that rules license.
//!
//! Each executor validates the node at the target path and builds a replacement subtree; the
//! input tree is never mutated, and all arithmetic is exact integer math. A validation mismatch
//! (the tree changed shape between generation and execution, or a rule was pointed at the wrong
//! kind of node) is reported as an [`ExecError`], never panicked on.
//!
//! Negative results are expressed as a unary minus over a non-negative literal, so every tree
//! an executor produces serializes to text the parser reads back as the same tree.

use crate::{
    primitive::{int, int_from_str},
    registry::table,
    tree::{self, as_fraction, as_integer, NodePath},
};
use rug::Integer;
use std::fmt;
use step_parser::parser::{
    binary::Binary,
    expr::Expr,
    literal::{LitFraction, LitInt},
    op::{BinOpKind, UnaryOp, UnaryOpKind},
    unary::Unary,
};

/// A primitive executor failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// No executor exists for the primitive id.
    UnknownPrimitive { id: String },

    /// The target path does not resolve to a node of the tree.
    MissingTarget { path: NodePath },

    /// The node at the target path is not the kind of node the primitive transforms.
    WrongNodeKind { primitive_id: String, path: NodePath },

    /// The transformation would divide by zero.
    DivisionByZero { path: NodePath },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownPrimitive { id } => write!(f, "no executor for primitive id `{}`", id),
            Self::MissingTarget { path } => write!(f, "target path `{}` does not resolve", path),
            Self::WrongNodeKind { primitive_id, path } => {
                write!(f, "primitive `{}` cannot transform the node at `{}`", primitive_id, path)
            },
            Self::DivisionByZero { path } => write!(f, "division by zero at `{}`", path),
        }
    }
}

impl std::error::Error for ExecError {}

/// Wraps an expression in a unary minus.
fn negate(expr: Expr) -> Expr {
    Expr::Unary(Unary {
        operand: Box::new(expr),
        op: UnaryOp { kind: UnaryOpKind::Neg, span: 0..0 },
        span: 0..0,
    })
}

/// Creates an integer node. A negative value becomes a unary minus over the literal.
fn make_integer(value: Integer) -> Expr {
    let negative = value < 0;
    let node = Expr::Integer(LitInt {
        value: value.abs().to_string(),
        span: 0..0,
    });
    if negative { negate(node) } else { node }
}

/// Creates a fraction node over a positive denominator. A negative numerator becomes a unary
/// minus over the literal. The fraction is not collapsed: `3/1` stays a fraction.
fn make_fraction(numerator: Integer, denominator: Integer) -> Expr {
    let negative = numerator < 0;
    let node = Expr::Fraction(LitFraction {
        numerator: numerator.abs().to_string(),
        denominator: denominator.to_string(),
        span: 0..0,
    });
    if negative { negate(node) } else { node }
}

fn wrong_kind(primitive_id: &str, path: &NodePath) -> ExecError {
    ExecError::WrongNodeKind {
        primitive_id: primitive_id.to_owned(),
        path: path.clone(),
    }
}

/// Reads the two fraction operands of a binary window with the given operator.
fn fraction_window(
    primitive_id: &str,
    node: &Expr,
    path: &NodePath,
    op: BinOpKind,
) -> Result<(Binary, tree::FractionParts, tree::FractionParts), ExecError> {
    let Expr::Binary(binary) = node else {
        return Err(wrong_kind(primitive_id, path));
    };
    if binary.op.kind != op {
        return Err(wrong_kind(primitive_id, path));
    }
    match (as_fraction(&binary.lhs), as_fraction(&binary.rhs)) {
        (Some(lhs), Some(rhs)) => Ok((binary.clone(), lhs, rhs)),
        _ => Err(wrong_kind(primitive_id, path)),
    }
}

/// `n` -> `n/1`, looking through parentheses and signs: `-(3)` -> `-(3/1)` in effect.
fn integer_to_fraction(primitive_id: &str, node: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let value = as_integer(node).ok_or_else(|| wrong_kind(primitive_id, path))?;
    Ok(make_fraction(value, int(1)))
}

/// `a/d (+|-) b/d` -> `(a (+|-) b)/d`.
fn same_denominator_combine(
    primitive_id: &str,
    node: &Expr,
    path: &NodePath,
    op: BinOpKind,
) -> Result<Expr, ExecError> {
    let (_, lhs, rhs) = fraction_window(primitive_id, node, path, op)?;
    if lhs.denominator != rhs.denominator {
        return Err(wrong_kind(primitive_id, path));
    }

    let denominator = lhs.denominator_value();
    let numerator = if op == BinOpKind::Add {
        lhs.numerator + rhs.numerator
    } else {
        lhs.numerator - rhs.numerator
    };
    Ok(make_fraction(numerator, denominator))
}

/// Scales both fractions of an addition or subtraction window to their least common
/// denominator, keeping the window itself in place.
fn match_denominators(primitive_id: &str, node: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let Expr::Binary(binary) = node else {
        return Err(wrong_kind(primitive_id, path));
    };
    if !matches!(binary.op.kind, BinOpKind::Add | BinOpKind::Sub) {
        return Err(wrong_kind(primitive_id, path));
    }
    let (binary, lhs, rhs) = fraction_window(primitive_id, node, path, binary.op.kind)?;

    let lhs_denominator = lhs.denominator_value();
    let rhs_denominator = rhs.denominator_value();
    let lcm = lhs_denominator.clone().lcm(&rhs_denominator);
    let lhs_scale = lcm.clone() / &lhs_denominator;
    let rhs_scale = lcm.clone() / &rhs_denominator;

    Ok(Expr::Binary(Binary {
        lhs: Box::new(make_fraction(lhs.numerator * lhs_scale, lcm.clone())),
        op: binary.op.clone(),
        rhs: Box::new(make_fraction(rhs.numerator * rhs_scale, lcm)),
        span: binary.span.clone(),
    }))
}

/// `a/b * c/d` -> `(a*c)/(b*d)`.
fn fraction_multiply(primitive_id: &str, node: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let (_, lhs, rhs) = fraction_window(primitive_id, node, path, BinOpKind::Mul)?;
    let denominator = lhs.denominator_value() * rhs.denominator_value();
    Ok(make_fraction(lhs.numerator * rhs.numerator, denominator))
}

/// `a/b / c/d` -> `(a*d)/(b*c)`.
fn fraction_divide(primitive_id: &str, node: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let (_, lhs, rhs) = fraction_window(primitive_id, node, path, BinOpKind::Div)?;
    if rhs.numerator == 0 {
        return Err(ExecError::DivisionByZero { path: path.clone() });
    }

    let lhs_denominator = lhs.denominator_value();
    let rhs_denominator = rhs.denominator_value();
    let negative = rhs.numerator < 0;

    let mut numerator = lhs.numerator * rhs_denominator;
    if negative {
        numerator = -numerator;
    }
    Ok(make_fraction(numerator, lhs_denominator * rhs.numerator.abs()))
}

/// Combines two integer operands under the given operator. Division falls back to a reduced
/// fraction when the quotient is not integral.
fn integer_combine(
    primitive_id: &str,
    node: &Expr,
    path: &NodePath,
    op: BinOpKind,
) -> Result<Expr, ExecError> {
    let Expr::Binary(binary) = node else {
        return Err(wrong_kind(primitive_id, path));
    };
    if binary.op.kind != op {
        return Err(wrong_kind(primitive_id, path));
    }
    let (a, b) = match (as_integer(&binary.lhs), as_integer(&binary.rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(wrong_kind(primitive_id, path)),
    };

    match op {
        BinOpKind::Add => Ok(make_integer(a + b)),
        BinOpKind::Sub => Ok(make_integer(a - b)),
        BinOpKind::Mul => Ok(make_integer(a * b)),
        BinOpKind::Div => {
            if b == 0 {
                return Err(ExecError::DivisionByZero { path: path.clone() });
            }
            if (a.clone() % b.clone()) == 0 {
                return Ok(make_integer(a / b));
            }

            let gcd = a.clone().abs().gcd(&b.clone().abs());
            let mut numerator = a / &gcd;
            let mut denominator = b / &gcd;
            if denominator < 0 {
                numerator = -numerator;
                denominator = -denominator;
            }
            Ok(make_fraction(numerator, denominator))
        },
    }
}

/// `w n/d` -> `(w*d + n)/d`. The denominator keeps the literal it was written with.
fn mixed_to_improper(primitive_id: &str, node: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let Expr::Mixed(mixed) = node else {
        return Err(wrong_kind(primitive_id, path));
    };

    let whole = int_from_str(&mixed.whole);
    let numerator = int_from_str(&mixed.numerator);
    let denominator = int_from_str(&mixed.denominator);
    Ok(Expr::Fraction(LitFraction {
        numerator: (whole * &denominator + numerator).to_string(),
        denominator: mixed.denominator.clone(),
        span: 0..0,
    }))
}

/// Reduces a fraction by its greatest common factor, collapsing a denominator of one to an
/// integer.
fn reduce_fraction(primitive_id: &str, node: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let Expr::Fraction(fraction) = node else {
        return Err(wrong_kind(primitive_id, path));
    };

    let numerator = int_from_str(&fraction.numerator);
    let denominator = int_from_str(&fraction.denominator);
    let gcd = numerator.clone().gcd(&denominator);
    if gcd == 1 && denominator != 1 {
        return Err(wrong_kind(primitive_id, path));
    }

    let numerator = numerator / &gcd;
    let denominator = denominator / &gcd;
    if denominator == 1 {
        Ok(make_integer(numerator))
    } else {
        Ok(make_fraction(numerator, denominator))
    }
}

/// Applies the primitive with the given id at `path`, returning the transformed tree. The
/// input tree is only read.
pub fn apply_primitive(id: &str, root: &Expr, path: &NodePath) -> Result<Expr, ExecError> {
    let node = tree::node_at(root, path).ok_or_else(|| ExecError::MissingTarget { path: path.clone() })?;

    let replacement = match id {
        table::INTEGER_TO_FRACTION => integer_to_fraction(id, node, path)?,
        table::SAME_DENOMINATOR_ADD => same_denominator_combine(id, node, path, BinOpKind::Add)?,
        table::SAME_DENOMINATOR_SUBTRACT => same_denominator_combine(id, node, path, BinOpKind::Sub)?,
        table::MATCH_DENOMINATORS => match_denominators(id, node, path)?,
        table::FRACTION_MULTIPLY => fraction_multiply(id, node, path)?,
        table::FRACTION_DIVIDE => fraction_divide(id, node, path)?,
        table::INTEGER_ADD => integer_combine(id, node, path, BinOpKind::Add)?,
        table::INTEGER_SUBTRACT => integer_combine(id, node, path, BinOpKind::Sub)?,
        table::INTEGER_MULTIPLY => integer_combine(id, node, path, BinOpKind::Mul)?,
        table::INTEGER_DIVIDE => integer_combine(id, node, path, BinOpKind::Div)?,
        table::MIXED_TO_IMPROPER => mixed_to_improper(id, node, path)?,
        table::REDUCE_FRACTION => reduce_fraction(id, node, path)?,
        _ => return Err(ExecError::UnknownPrimitive { id: id.to_owned() }),
    };

    tree::replace_at(root, path, replacement).ok_or_else(|| ExecError::MissingTarget { path: path.clone() })
}

/// Checks that the primitive can run at the path, without keeping the result. Transforms are
/// pure and cheap, so validation simply runs one and discards it.
pub fn validate_primitive(id: &str, root: &Expr, path: &NodePath) -> Result<(), ExecError> {
    apply_primitive(id, root, path).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use step_parser::parser::Parser;

    fn parse(source: &str) -> Expr {
        Parser::new(source).try_parse_full::<Expr>().unwrap()
    }

    /// Applies the primitive at the given path and returns the serialized result.
    fn apply(id: &str, source: &str, path: Vec<usize>) -> Result<String, ExecError> {
        let tree = parse(source);
        apply_primitive(id, &tree, &NodePath::from(path)).map(|tree| tree.to_string())
    }

    #[test]
    fn integer_to_fraction_executor() {
        assert_eq!(apply(table::INTEGER_TO_FRACTION, "3 + 2/5", vec![0]).unwrap(), "3/1 + 2/5");
        assert_eq!(apply(table::INTEGER_TO_FRACTION, "-3 + 2/5", vec![0]).unwrap(), "-3/1 + 2/5");
    }

    #[test]
    fn same_denominator_executors() {
        assert_eq!(apply(table::SAME_DENOMINATOR_ADD, "1/3 + 2/3", vec![]).unwrap(), "3/3");
        assert_eq!(apply(table::SAME_DENOMINATOR_SUBTRACT, "5/7 - 2/7", vec![]).unwrap(), "3/7");
        // a negative result is a unary minus over the literal
        assert_eq!(apply(table::SAME_DENOMINATOR_SUBTRACT, "2/7 - 5/7", vec![]).unwrap(), "-3/7");
        // signed operands are read through the sign
        assert_eq!(apply(table::SAME_DENOMINATOR_ADD, "-1/3 + 2/3", vec![]).unwrap(), "1/3");
    }

    #[test]
    fn match_denominators_executor() {
        assert_eq!(apply(table::MATCH_DENOMINATORS, "1/3 + 2/5", vec![]).unwrap(), "5/15 + 6/15");
        assert_eq!(apply(table::MATCH_DENOMINATORS, "1/4 - 1/6", vec![]).unwrap(), "3/12 - 2/12");
    }

    #[test]
    fn fraction_multiply_and_divide_executors() {
        assert_eq!(apply(table::FRACTION_MULTIPLY, "1/3 * 2/5", vec![]).unwrap(), "2/15");
        assert_eq!(apply(table::FRACTION_DIVIDE, "3/1 / 2/5", vec![]).unwrap(), "15/2");
        assert_eq!(
            apply(table::FRACTION_DIVIDE, "1/3 / 0/5", vec![]),
            Err(ExecError::DivisionByZero { path: NodePath::root() }),
        );
    }

    #[test]
    fn integer_executors() {
        assert_eq!(apply(table::INTEGER_ADD, "3 + 4", vec![]).unwrap(), "7");
        assert_eq!(apply(table::INTEGER_SUBTRACT, "3 - 5", vec![]).unwrap(), "-2");
        assert_eq!(apply(table::INTEGER_MULTIPLY, "3 * 4", vec![]).unwrap(), "12");
        assert_eq!(apply(table::INTEGER_DIVIDE, "(6) / 2", vec![]).unwrap(), "3");
        // an inexact quotient becomes a reduced fraction
        assert_eq!(apply(table::INTEGER_DIVIDE, "(6) / 4", vec![]).unwrap(), "3/2");
    }

    #[test]
    fn mixed_to_improper_executor() {
        assert_eq!(apply(table::MIXED_TO_IMPROPER, "1 2/3", vec![]).unwrap(), "5/3");
        assert_eq!(apply(table::MIXED_TO_IMPROPER, "1 2/3 + 1/3", vec![0]).unwrap(), "5/3 + 1/3");
    }

    #[test]
    fn reduce_fraction_executor() {
        assert_eq!(apply(table::REDUCE_FRACTION, "4/8", vec![]).unwrap(), "1/2");
        assert_eq!(apply(table::REDUCE_FRACTION, "3/3", vec![]).unwrap(), "1");
        assert_eq!(apply(table::REDUCE_FRACTION, "5/1", vec![]).unwrap(), "5");
        assert_eq!(
            apply(table::REDUCE_FRACTION, "2/5", vec![]),
            Err(ExecError::WrongNodeKind {
                primitive_id: table::REDUCE_FRACTION.to_owned(),
                path: NodePath::root(),
            }),
        );
    }

    #[test]
    fn wrong_node_kind_is_reported() {
        assert_eq!(
            apply(table::SAME_DENOMINATOR_ADD, "3 + 4", vec![]),
            Err(ExecError::WrongNodeKind {
                primitive_id: table::SAME_DENOMINATOR_ADD.to_owned(),
                path: NodePath::root(),
            }),
        );
        assert_eq!(
            apply(table::INTEGER_TO_FRACTION, "1/2", vec![]),
            Err(ExecError::WrongNodeKind {
                primitive_id: table::INTEGER_TO_FRACTION.to_owned(),
                path: NodePath::root(),
            }),
        );
    }

    #[test]
    fn missing_target_is_reported() {
        assert_eq!(
            apply(table::INTEGER_ADD, "3 + 4", vec![5]),
            Err(ExecError::MissingTarget { path: NodePath::from(vec![5]) }),
        );
    }

    #[test]
    fn unknown_primitive_is_reported() {
        assert_eq!(
            apply("does-not-exist", "3 + 4", vec![]),
            Err(ExecError::UnknownPrimitive { id: String::from("does-not-exist") }),
        );
    }

    #[test]
    fn validate_does_not_transform() {
        let tree = parse("1/3 + 2/3");
        validate_primitive(table::SAME_DENOMINATOR_ADD, &tree, &NodePath::root()).unwrap();
        assert_eq!(tree.to_string(), "1/3 + 2/3");
    }
}
