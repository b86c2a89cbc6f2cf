//! Index-path addressing and pure tree surgery over expression trees.
//!
//! A node is addressed by the sequence of child ordinals leading to it from the root. Paths are
//! recomputed on every fresh parse and must never be cached across a transformation: tree
//! surgery produces a *new* tree, and the old paths describe the old one.
//!
//! The human-readable `term[0].term[1]` form is only a pretty-printer/parser pair around the
//! index path; nothing in the engine resolves nodes by parsing strings apart from the boundary
//! where a caller hands in a selection.

use crate::primitive::int_from_str;
use rug::Integer;
use std::{fmt, str::FromStr};
use step_parser::parser::{expr::Expr, op::UnaryOpKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A path from the root of an expression tree to one of its nodes, as a sequence of child
/// ordinals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the root node.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The child ordinals of the path, from the root down.
    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// Returns the path of the given child of this node.
    pub fn child(&self, ordinal: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(ordinal);
        Self(segments)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return write!(f, "root");
        }

        let mut iter = self.0.iter();
        if let Some(ordinal) = iter.next() {
            write!(f, "term[{}]", ordinal)?;
            for ordinal in iter {
                write!(f, ".term[{}]", ordinal)?;
            }
        }
        Ok(())
    }
}

/// The error returned when a path string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPath;

impl fmt::Display for InvalidPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid node path")
    }
}

impl std::error::Error for InvalidPath {}

impl FromStr for NodePath {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "root" {
            return Ok(Self::root());
        }

        s.split('.')
            .map(|segment| {
                segment
                    .strip_prefix("term[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .and_then(|ordinal| ordinal.parse::<usize>().ok())
                    .ok_or(InvalidPath)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Returns the children of a node, in ordinal order.
pub fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Binary(binary) => vec![&binary.lhs, &binary.rhs],
        Expr::Unary(unary) => vec![&unary.operand],
        Expr::Paren(paren) => vec![&paren.inner],
        Expr::Integer(_) | Expr::Fraction(_) | Expr::Mixed(_) => Vec::new(),
    }
}

/// Resolves a path to a node of the tree. Returns [`None`] if the path walks off the tree.
pub fn node_at<'a>(root: &'a Expr, path: &NodePath) -> Option<&'a Expr> {
    let mut node = root;
    for &ordinal in path.segments() {
        node = *children(node).get(ordinal)?;
    }
    Some(node)
}

/// Returns a copy of the tree with the node at `path` replaced by `replacement`. The input tree
/// is never mutated. Returns [`None`] if the path does not resolve.
pub fn replace_at(root: &Expr, path: &NodePath, replacement: Expr) -> Option<Expr> {
    let Some((&ordinal, rest)) = path.segments().split_first() else {
        return Some(replacement);
    };
    let rest = NodePath::from(rest.to_vec());

    match (root, ordinal) {
        (Expr::Binary(binary), 0) => {
            let inner = replace_at(&binary.lhs, &rest, replacement)?;
            let mut binary = binary.clone();
            *binary.lhs = inner;
            Some(Expr::Binary(binary))
        },
        (Expr::Binary(binary), 1) => {
            let inner = replace_at(&binary.rhs, &rest, replacement)?;
            let mut binary = binary.clone();
            *binary.rhs = inner;
            Some(Expr::Binary(binary))
        },
        (Expr::Unary(unary), 0) => {
            let inner = replace_at(&unary.operand, &rest, replacement)?;
            let mut unary = unary.clone();
            *unary.operand = inner;
            Some(Expr::Unary(unary))
        },
        (Expr::Paren(paren), 0) => {
            let inner = replace_at(&paren.inner, &rest, replacement)?;
            let mut paren = paren.clone();
            *paren.inner = inner;
            Some(Expr::Paren(paren))
        },
        _ => None,
    }
}

/// Visits every node of the tree in depth-first pre-order, pairing each with its path.
pub fn walk(root: &Expr) -> Vec<(NodePath, &Expr)> {
    fn go<'a>(node: &'a Expr, path: NodePath, out: &mut Vec<(NodePath, &'a Expr)>) {
        for (ordinal, child) in children(node).into_iter().enumerate() {
            let child_path = path.child(ordinal);
            out.push((child_path.clone(), child));
            go(child, child_path, out);
        }
    }

    let mut out = vec![(NodePath::root(), root)];
    go(root, NodePath::root(), &mut out);
    out
}

/// Returns the path of the binary node holding the `index`-th operator of the source text, in
/// left-to-right source order.
pub fn operator_at(root: &Expr, index: usize) -> Option<NodePath> {
    let mut operators: Vec<(usize, NodePath)> = walk(root)
        .into_iter()
        .filter_map(|(path, node)| match node {
            Expr::Binary(binary) => Some((binary.op.span.start, path)),
            _ => None,
        })
        .collect();

    operators.sort_by_key(|(start, _)| *start);
    operators.into_iter().nth(index).map(|(_, path)| path)
}

/// Looks through parentheses and unary sign operators, returning whether the wrapped node is
/// negated and the node itself.
fn signed(expr: &Expr) -> (bool, &Expr) {
    let mut node = expr;
    let mut negative = false;
    loop {
        match node {
            Expr::Paren(paren) => node = &paren.inner,
            Expr::Unary(unary) => {
                if unary.op.kind == UnaryOpKind::Neg {
                    negative = !negative;
                }
                node = &unary.operand;
            },
            _ => return (negative, node),
        }
    }
}

/// Reads an integer operand with its sign applied, looking through parentheses and unary sign
/// operators. Returns [`None`] if the expression is not an integer literal.
pub fn as_integer(expr: &Expr) -> Option<Integer> {
    let (negative, node) = signed(expr);
    match node {
        Expr::Integer(int) => {
            let value = int_from_str(&int.value);
            Some(if negative { -value } else { value })
        },
        _ => None,
    }
}

/// A fraction operand, extracted from the tree for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FractionParts {
    /// The numerator value, with any surrounding sign applied.
    pub numerator: Integer,

    /// The denominator exactly as written. Comparing denominators compares these literals.
    pub denominator: String,
}

impl FractionParts {
    /// The denominator parsed to a value.
    pub fn denominator_value(&self) -> Integer {
        int_from_str(&self.denominator)
    }
}

/// Reads a fraction operand, looking through parentheses and unary sign operators. Returns
/// [`None`] if the expression is not a fraction literal.
pub fn as_fraction(expr: &Expr) -> Option<FractionParts> {
    let (negative, node) = signed(expr);
    match node {
        Expr::Fraction(fraction) => {
            let numerator = int_from_str(&fraction.numerator);
            Some(FractionParts {
                numerator: if negative { -numerator } else { numerator },
                denominator: fraction.denominator.clone(),
            })
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use step_parser::parser::{Parser, op::BinOpKind};

    fn parse(source: &str) -> Expr {
        Parser::new(source).try_parse_full::<Expr>().unwrap()
    }

    #[test]
    fn path_display_round_trip() {
        for path in [
            NodePath::root(),
            NodePath::from(vec![0]),
            NodePath::from(vec![0, 1]),
            NodePath::from(vec![1, 0, 1]),
        ] {
            assert_eq!(path.to_string().parse::<NodePath>().unwrap(), path);
        }

        assert_eq!("root".parse::<NodePath>().unwrap(), NodePath::root());
        assert_eq!("term[0].term[1]".parse::<NodePath>().unwrap(), NodePath::from(vec![0, 1]));
        assert!("term[x]".parse::<NodePath>().is_err());
        assert!("foo[0]".parse::<NodePath>().is_err());
    }

    #[test]
    fn resolve_nodes() {
        let tree = parse("1/3 + (2/5 * 2)");

        assert!(matches!(node_at(&tree, &NodePath::root()), Some(Expr::Binary(_))));
        assert!(matches!(node_at(&tree, &NodePath::from(vec![0])), Some(Expr::Fraction(_))));
        assert!(matches!(node_at(&tree, &NodePath::from(vec![1])), Some(Expr::Paren(_))));
        assert!(matches!(node_at(&tree, &NodePath::from(vec![1, 0])), Some(Expr::Binary(_))));
        assert_eq!(node_at(&tree, &NodePath::from(vec![2])), None);
        assert_eq!(node_at(&tree, &NodePath::from(vec![0, 0])), None);
    }

    #[test]
    fn replace_builds_a_new_tree() {
        let tree = parse("1/3 + 2/5");
        let replacement = parse("7/15");

        let replaced = replace_at(&tree, &NodePath::from(vec![0]), replacement).unwrap();
        assert_eq!(replaced.to_string(), "7/15 + 2/5");

        // the original tree is untouched
        assert_eq!(tree.to_string(), "1/3 + 2/5");
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = parse("1 + 2 * 3");
        let paths: Vec<String> = walk(&tree).into_iter().map(|(path, _)| path.to_string()).collect();
        assert_eq!(paths, vec![
            "root",
            "term[0]",
            "term[1]",
            "term[1].term[0]",
            "term[1].term[1]",
        ]);
    }

    #[test]
    fn operator_ordinals_follow_source_order() {
        let tree = parse("1/3 + 2/5 * 2 - 1");

        let add = operator_at(&tree, 0).unwrap();
        let mul = operator_at(&tree, 1).unwrap();
        let sub = operator_at(&tree, 2).unwrap();

        assert!(matches!(node_at(&tree, &add), Some(Expr::Binary(b)) if b.op.kind == BinOpKind::Add));
        assert!(matches!(node_at(&tree, &mul), Some(Expr::Binary(b)) if b.op.kind == BinOpKind::Mul));
        assert!(matches!(node_at(&tree, &sub), Some(Expr::Binary(b)) if b.op.kind == BinOpKind::Sub));
        assert_eq!(operator_at(&tree, 3), None);
    }

    #[test]
    fn signed_operands() {
        let tree = parse("-(3) + -1/2");
        let Expr::Binary(binary) = &tree else { panic!("expected binary expression") };

        assert_eq!(as_integer(&binary.lhs), Some(Integer::from(-3)));
        let fraction = as_fraction(&binary.rhs).unwrap();
        assert_eq!(fraction.numerator, -1);
        assert_eq!(fraction.denominator, "2");
        assert_eq!(as_integer(&binary.rhs), None);
    }
}
