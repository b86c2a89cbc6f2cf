//! The built-in declarative rule table, partitioned by arithmetic domain.

use super::{predicate::Predicate, InvariantRule, InvariantSet, PrimitiveRecord, RegistryTable};
use once_cell::sync::Lazy;
use step_parser::parser::op::BinOpKind;

pub const INTEGER_ADD: &str = "integer-add";
pub const INTEGER_SUBTRACT: &str = "integer-subtract";
pub const INTEGER_MULTIPLY: &str = "integer-multiply";
pub const INTEGER_DIVIDE: &str = "integer-divide";
pub const INTEGER_TO_FRACTION: &str = "integer-to-fraction";
pub const SAME_DENOMINATOR_ADD: &str = "same-denominator-add";
pub const SAME_DENOMINATOR_SUBTRACT: &str = "same-denominator-subtract";
pub const MATCH_DENOMINATORS: &str = "match-denominators";
pub const FRACTION_MULTIPLY: &str = "fraction-multiply";
pub const FRACTION_DIVIDE: &str = "fraction-divide";
pub const REDUCE_FRACTION: &str = "reduce-fraction";
pub const MIXED_TO_IMPROPER: &str = "mixed-to-improper";

/// The id of the rule whose candidates prepare a mixed-type window instead of transforming it
/// directly; the generator targets the integer operand and marks the candidate as support.
pub const NORMALIZE_INTEGER_OPERAND: &str = "integer-operand-normalization";

fn primitive(id: &str, description: &str) -> PrimitiveRecord {
    PrimitiveRecord {
        id: id.to_owned(),
        description: description.to_owned(),
    }
}

fn rule(
    id: &str,
    description: &str,
    priority: u32,
    primitive_ids: &[&str],
    predicate: Predicate,
) -> InvariantRule {
    InvariantRule {
        id: id.to_owned(),
        // filled in by the loader
        invariant_set_id: String::new(),
        description: description.to_owned(),
        priority,
        primitive_ids: primitive_ids.iter().map(|id| (*id).to_owned()).collect(),
        scenario_id: None,
        teaching_tag: None,
        predicate,
    }
}

static BUILTIN: Lazy<RegistryTable> = Lazy::new(|| RegistryTable {
    primitives: vec![
        primitive(INTEGER_ADD, "add two integers"),
        primitive(INTEGER_SUBTRACT, "subtract an integer from another"),
        primitive(INTEGER_MULTIPLY, "multiply two integers"),
        primitive(INTEGER_DIVIDE, "divide an integer by another"),
        primitive(INTEGER_TO_FRACTION, "rewrite an integer n as the fraction n/1"),
        primitive(SAME_DENOMINATOR_ADD, "add two fractions over their shared denominator"),
        primitive(SAME_DENOMINATOR_SUBTRACT, "subtract two fractions over their shared denominator"),
        primitive(MATCH_DENOMINATORS, "scale both fractions to their least common denominator"),
        primitive(FRACTION_MULTIPLY, "multiply two fractions"),
        primitive(FRACTION_DIVIDE, "divide a fraction by another"),
        primitive(REDUCE_FRACTION, "reduce a fraction by its greatest common factor"),
        primitive(MIXED_TO_IMPROPER, "rewrite a mixed number as an improper fraction"),
    ],
    sets: vec![
        InvariantSet {
            id: String::from("integers"),
            description: String::from("whole number arithmetic"),
            rules: vec![
                rule(
                    "integer-addition",
                    "add the two whole numbers",
                    10,
                    &[INTEGER_ADD],
                    Predicate::IntegerWindow { op: BinOpKind::Add },
                ),
                rule(
                    "integer-subtraction",
                    "subtract the two whole numbers",
                    20,
                    &[INTEGER_SUBTRACT],
                    Predicate::IntegerWindow { op: BinOpKind::Sub },
                ),
                rule(
                    "integer-multiplication",
                    "multiply the two whole numbers",
                    30,
                    &[INTEGER_MULTIPLY],
                    Predicate::IntegerWindow { op: BinOpKind::Mul },
                ),
                rule(
                    "integer-division",
                    "divide the two whole numbers",
                    40,
                    &[INTEGER_DIVIDE],
                    Predicate::IntegerWindow { op: BinOpKind::Div },
                ),
            ],
        },
        InvariantSet {
            id: String::from("fractions-same-denominator"),
            description: String::from("fractions sharing a written denominator"),
            rules: vec![
                InvariantRule {
                    teaching_tag: Some(String::from("same-denominator")),
                    ..rule(
                        "same-denominator-addition",
                        "add the numerators over the shared denominator",
                        10,
                        &[SAME_DENOMINATOR_ADD],
                        Predicate::SameDenominatorWindow { op: BinOpKind::Add },
                    )
                },
                InvariantRule {
                    teaching_tag: Some(String::from("same-denominator")),
                    ..rule(
                        "same-denominator-subtraction",
                        "subtract the numerators over the shared denominator",
                        20,
                        &[SAME_DENOMINATOR_SUBTRACT],
                        Predicate::SameDenominatorWindow { op: BinOpKind::Sub },
                    )
                },
            ],
        },
        InvariantSet {
            id: String::from("fractions-generic"),
            description: String::from("fractions with any denominators"),
            rules: vec![
                InvariantRule {
                    teaching_tag: Some(String::from("common-denominator")),
                    scenario_id: Some(String::from("add-thirds-and-fifths")),
                    ..rule(
                        "addition-via-common-denominator",
                        "match the denominators, then add the numerators",
                        10,
                        &[MATCH_DENOMINATORS, SAME_DENOMINATOR_ADD],
                        Predicate::UnequalDenominatorWindow { op: BinOpKind::Add },
                    )
                },
                InvariantRule {
                    teaching_tag: Some(String::from("common-denominator")),
                    ..rule(
                        "subtraction-via-common-denominator",
                        "match the denominators, then subtract the numerators",
                        20,
                        &[MATCH_DENOMINATORS, SAME_DENOMINATOR_SUBTRACT],
                        Predicate::UnequalDenominatorWindow { op: BinOpKind::Sub },
                    )
                },
                rule(
                    "fraction-multiplication",
                    "multiply numerators and denominators",
                    30,
                    &[FRACTION_MULTIPLY],
                    Predicate::FractionWindow { op: BinOpKind::Mul },
                ),
                rule(
                    "fraction-division",
                    "multiply by the reciprocal of the divisor",
                    40,
                    &[FRACTION_DIVIDE],
                    Predicate::FractionWindow { op: BinOpKind::Div },
                ),
                rule(
                    NORMALIZE_INTEGER_OPERAND,
                    "rewrite the whole number as a fraction over 1",
                    50,
                    &[INTEGER_TO_FRACTION],
                    Predicate::MixedTypeWindow,
                ),
                rule(
                    "fraction-reduction",
                    "reduce the fraction to lowest terms",
                    60,
                    &[REDUCE_FRACTION],
                    Predicate::ReducibleFraction,
                ),
            ],
        },
        InvariantSet {
            id: String::from("mixed"),
            description: String::from("mixed numbers"),
            rules: vec![rule(
                "mixed-number-expansion",
                "rewrite the mixed number as an improper fraction",
                10,
                &[MIXED_TO_IMPROPER],
                Predicate::MixedNumber,
            )],
        },
    ],
});

/// Returns a copy of the built-in rule table.
pub fn builtin() -> RegistryTable {
    BUILTIN.clone()
}
