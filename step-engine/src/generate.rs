//! Candidate generation: resolving the anchor and matching the rule catalog against the tree.
//!
//! Generation is deliberately broad: every rule of the requested sets is evaluated at every
//! node, in rule-table order, and the resolved anchor is reported alongside the candidates.
//! Narrowing the candidates to the learner's selection is the pipeline's job (the locality
//! filter), not the generator's — the support candidate for a mixed-type window targets an
//! *operand* of the window, which only the full walk can pair with a selection on that operand.

use crate::{
    registry::{predicate::Predicate, InvariantRule, Registry},
    tree::{self, as_integer, NodePath},
};
use step_parser::parser::expr::Expr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the caller indicated the anchor of the step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnchorSelection {
    /// No selection; the anchor is the whole expression.
    #[default]
    WholeExpression,

    /// A tree path in `term[0].term[1]` form.
    Path(String),

    /// The ordinal of a binary operator, in left-to-right source order.
    OperatorOrdinal(usize),
}

/// The category of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CandidateCategory {
    /// The rule transforms the matched window directly.
    Direct,

    /// The rule prepares an operand so that a direct rule becomes applicable.
    Support,
}

/// A proposed step, not yet committed: a rule, the path it would transform, and the primitives
/// it would invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// The position of the candidate in generation order.
    pub id: usize,

    /// The rule that produced the candidate.
    pub invariant_rule_id: String,

    /// The primitives the candidate would invoke, in order. The first entry is the primary
    /// primitive.
    pub primitive_ids: Vec<String>,

    /// The path of the node the candidate would transform.
    pub target: NodePath,

    /// A human-readable description of the step.
    pub description: String,

    /// Whether the candidate transforms its window directly or prepares it.
    pub category: CandidateCategory,
}

/// The result of candidate generation.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Every candidate, in rule-table order.
    pub candidates: Vec<Candidate>,

    /// The anchor the selection resolved to, when one was given and it resolved.
    pub resolved_anchor: Option<NodePath>,
}

/// Resolves the caller's selection against the current tree. A selection that does not resolve
/// degrades to the whole expression rather than failing.
fn resolve_anchor(tree: &Expr, selection: &AnchorSelection) -> Option<NodePath> {
    match selection {
        AnchorSelection::WholeExpression => None,
        AnchorSelection::Path(text) => text
            .parse::<NodePath>()
            .ok()
            .filter(|path| tree::node_at(tree, path).is_some()),
        AnchorSelection::OperatorOrdinal(index) => tree::operator_at(tree, *index),
    }
}

/// Builds the candidate for a rule that matched at the given node.
fn make_candidate(id: usize, rule: &InvariantRule, path: &NodePath, node: &Expr) -> Candidate {
    // a mixed-type window is not transformed in place; the rule offers to prepare its integer
    // operand instead
    let (target, category) = if rule.predicate == Predicate::MixedTypeWindow {
        let ordinal = match node {
            Expr::Binary(binary) if as_integer(&binary.lhs).is_some() => 0,
            _ => 1,
        };
        (path.child(ordinal), CandidateCategory::Support)
    } else {
        (path.clone(), CandidateCategory::Direct)
    };

    Candidate {
        id,
        invariant_rule_id: rule.id.clone(),
        primitive_ids: rule.primitive_ids.clone(),
        description: format!("{} at {}", rule.description, target),
        target,
        category,
    }
}

/// Walks the tree and emits a candidate for every rule of the requested sets that matches,
/// in rule-table order. Pure: the tree, registry and selection are only read.
pub fn generate(
    registry: &Registry,
    tree: &Expr,
    selection: &AnchorSelection,
    set_ids: &[String],
) -> Generated {
    let resolved_anchor = resolve_anchor(tree, selection);
    let nodes = tree::walk(tree);

    let mut candidates = Vec::new();
    for set_id in set_ids {
        let Some(set) = registry.get_invariant_set_by_id(set_id) else { continue };
        for rule in &set.rules {
            for (path, node) in &nodes {
                if rule.predicate.matches(node) {
                    candidates.push(make_candidate(candidates.len(), rule, path, node));
                }
            }
        }
    }

    Generated { candidates, resolved_anchor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::table;
    use pretty_assertions::assert_eq;
    use step_parser::parser::Parser;

    fn parse(source: &str) -> Expr {
        Parser::new(source).try_parse_full::<Expr>().unwrap()
    }

    fn generate_all(tree: &Expr, selection: &AnchorSelection) -> Generated {
        let registry = Registry::builtin();
        let set_ids = registry.set_ids();
        generate(&registry, tree, selection, &set_ids)
    }

    #[test]
    fn same_denominator_subtraction_is_the_only_candidate() {
        let tree = parse("5/7 - 2/7");
        let generated = generate_all(&tree, &AnchorSelection::WholeExpression);

        assert_eq!(generated.candidates.len(), 1);
        let candidate = &generated.candidates[0];
        assert_eq!(candidate.primitive_ids, vec![table::SAME_DENOMINATOR_SUBTRACT.to_owned()]);
        assert_eq!(candidate.target, NodePath::root());
        assert_eq!(candidate.category, CandidateCategory::Direct);
    }

    #[test]
    fn mixed_type_window_offers_a_support_candidate() {
        let tree = parse("3 + 2/5");
        let generated = generate_all(&tree, &AnchorSelection::WholeExpression);

        assert_eq!(generated.candidates.len(), 1);
        let candidate = &generated.candidates[0];
        assert_eq!(candidate.category, CandidateCategory::Support);
        assert_eq!(candidate.target, NodePath::from(vec![0]));
        assert_eq!(candidate.primitive_ids, vec![table::INTEGER_TO_FRACTION.to_owned()]);
    }

    #[test]
    fn support_candidate_targets_the_integer_operand_on_either_side() {
        let tree = parse("2/5 * 3");
        let generated = generate_all(&tree, &AnchorSelection::WholeExpression);

        let support: Vec<_> = generated
            .candidates
            .iter()
            .filter(|candidate| candidate.category == CandidateCategory::Support)
            .collect();
        assert_eq!(support.len(), 1);
        assert_eq!(support[0].target, NodePath::from(vec![1]));
    }

    #[test]
    fn candidates_follow_rule_table_order() {
        // the inner window matches the same-denominator set, the reducible fraction the
        // generic set; set order puts the same-denominator candidate first
        let tree = parse("1/3 + 2/3");
        let generated = generate_all(&tree, &AnchorSelection::WholeExpression);

        assert_eq!(generated.candidates[0].invariant_rule_id, "same-denominator-addition");
        for (index, candidate) in generated.candidates.iter().enumerate() {
            assert_eq!(candidate.id, index);
        }
    }

    #[test]
    fn anchor_resolution() {
        let tree = parse("1/3 + 2/5 * 2");

        let by_path = generate_all(&tree, &AnchorSelection::Path(String::from("term[1]")));
        assert_eq!(by_path.resolved_anchor, Some(NodePath::from(vec![1])));

        let by_ordinal = generate_all(&tree, &AnchorSelection::OperatorOrdinal(1));
        assert_eq!(by_ordinal.resolved_anchor, Some(NodePath::from(vec![1])));

        // an unresolvable selection degrades to the whole expression
        let missing = generate_all(&tree, &AnchorSelection::Path(String::from("term[7]")));
        assert_eq!(missing.resolved_anchor, None);
        let garbage = generate_all(&tree, &AnchorSelection::Path(String::from("not-a-path")));
        assert_eq!(garbage.resolved_anchor, None);
    }
}
