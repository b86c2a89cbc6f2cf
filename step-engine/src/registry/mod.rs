//! The invariant registry: the immutable catalog of mathematical rules.
//!
//! A [`Registry`] is loaded once from a declarative [`RegistryTable`] and never changes
//! afterwards. Loading is fail-fast: a malformed table is rejected with a [`RegistryError`]
//! instead of surfacing later during matching. Lookups return defensive copies, so no caller
//! can mutate registry state through a returned record.
//!
//! Registries are explicit, constructor-injected values. There is no global registry; share one
//! across sessions by reference (it is read-only after load, so no locking is needed).

pub mod predicate;
pub mod table;

use predicate::Predicate;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A primitive transformation that an executor can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrimitiveRecord {
    /// The unique id of the primitive.
    pub id: String,

    /// A human-readable description of the transformation.
    pub description: String,
}

/// A rule licensing one or more primitive transformations under a structural predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InvariantRule {
    /// The unique id of the rule.
    pub id: String,

    /// The id of the invariant set this rule belongs to. Filled in by the loader.
    pub invariant_set_id: String,

    /// A human-readable description of the rule.
    pub description: String,

    /// The priority of the rule. Recorded for future scoring selectors; selection today is
    /// table order.
    pub priority: u32,

    /// The primitives the rule licenses. The first entry is the primary primitive; later
    /// entries are preparatory primitives implied by the same rule, applied in order.
    pub primitive_ids: Vec<String>,

    /// An optional scenario this rule was authored for.
    pub scenario_id: Option<String>,

    /// An optional tag grouping rules by the concept they teach.
    pub teaching_tag: Option<String>,

    /// The structural predicate describing when the rule applies.
    pub predicate: Predicate,
}

/// A domain-partitioned group of rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InvariantSet {
    /// The unique id of the set.
    pub id: String,

    /// A human-readable description of the domain the set covers.
    pub description: String,

    /// The rules of the set, in matching order.
    pub rules: Vec<InvariantRule>,
}

/// The declarative table a [`Registry`] is loaded from. See [`table::builtin`] for the built-in
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegistryTable {
    /// Every primitive the table's rules may reference.
    pub primitives: Vec<PrimitiveRecord>,

    /// The invariant sets, in matching order.
    pub sets: Vec<InvariantSet>,
}

/// A structural problem with a [`RegistryTable`], reported at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two primitives share an id.
    DuplicatePrimitive { id: String },

    /// Two invariant sets share an id.
    DuplicateSet { id: String },

    /// Two rules share an id.
    DuplicateRule { id: String },

    /// A rule references a primitive id that is not in the table.
    UnknownPrimitive { rule_id: String, primitive_id: String },

    /// A rule licenses no primitives at all.
    EmptyPrimitives { rule_id: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicatePrimitive { id } => write!(f, "duplicate primitive id `{}`", id),
            Self::DuplicateSet { id } => write!(f, "duplicate invariant set id `{}`", id),
            Self::DuplicateRule { id } => write!(f, "duplicate rule id `{}`", id),
            Self::UnknownPrimitive { rule_id, primitive_id } => {
                write!(f, "rule `{}` references unknown primitive id `{}`", rule_id, primitive_id)
            },
            Self::EmptyPrimitives { rule_id } => {
                write!(f, "rule `{}` licenses no primitives", rule_id)
            },
        }
    }
}

impl std::error::Error for RegistryError {}

/// The loaded, validated, immutable rule catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub(crate) primitives: HashMap<String, PrimitiveRecord>,
    pub(crate) sets: Vec<InvariantSet>,
}

impl Registry {
    /// Loads a registry from a declarative table, validating it.
    ///
    /// Validation is fail-fast: a duplicate primitive, set or rule id, a rule referencing an
    /// unknown primitive, or a rule licensing no primitives at all rejects the whole table.
    pub fn load(table: RegistryTable) -> Result<Self, RegistryError> {
        let mut primitives = HashMap::new();
        for primitive in table.primitives {
            let id = primitive.id.clone();
            if primitives.insert(id.clone(), primitive).is_some() {
                return Err(RegistryError::DuplicatePrimitive { id });
            }
        }

        let mut set_ids = HashSet::new();
        let mut rule_ids = HashSet::new();
        let mut sets = table.sets;
        for set in &mut sets {
            if !set_ids.insert(set.id.clone()) {
                return Err(RegistryError::DuplicateSet { id: set.id.clone() });
            }

            for rule in &mut set.rules {
                if !rule_ids.insert(rule.id.clone()) {
                    return Err(RegistryError::DuplicateRule { id: rule.id.clone() });
                }
                if rule.primitive_ids.is_empty() {
                    return Err(RegistryError::EmptyPrimitives { rule_id: rule.id.clone() });
                }
                for primitive_id in &rule.primitive_ids {
                    if !primitives.contains_key(primitive_id) {
                        return Err(RegistryError::UnknownPrimitive {
                            rule_id: rule.id.clone(),
                            primitive_id: primitive_id.clone(),
                        });
                    }
                }

                rule.invariant_set_id = set.id.clone();
            }
        }

        Ok(Self { primitives, sets })
    }

    /// Loads the built-in rule catalog.
    pub fn builtin() -> Self {
        Self::load(table::builtin()).expect("the built-in rule table is valid")
    }

    /// Returns true if the given primitive id is registered.
    pub fn contains_primitive(&self, id: &str) -> bool {
        self.primitives.contains_key(id)
    }

    /// Returns a copy of the primitive with the given id.
    pub fn get_primitive_by_id(&self, id: &str) -> Option<PrimitiveRecord> {
        self.primitives.get(id).cloned()
    }

    /// Returns a copy of the invariant set with the given id.
    pub fn get_invariant_set_by_id(&self, id: &str) -> Option<InvariantSet> {
        self.sets.iter().find(|set| set.id == id).cloned()
    }

    /// Returns a copy of every invariant set, in matching order.
    pub fn get_all_invariant_sets(&self) -> Vec<InvariantSet> {
        self.sets.clone()
    }

    /// Returns the ids of every invariant set, in matching order.
    pub fn set_ids(&self) -> Vec<String> {
        self.sets.iter().map(|set| set.id.clone()).collect()
    }

    /// Returns a copy of every rule that licenses the given primitive.
    pub fn find_rules_by_primitive_id(&self, id: &str) -> Vec<InvariantRule> {
        self.sets
            .iter()
            .flat_map(|set| &set.rules)
            .filter(|rule| rule.primitive_ids.iter().any(|primitive_id| primitive_id == id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_table() -> RegistryTable {
        RegistryTable {
            primitives: vec![PrimitiveRecord {
                id: String::from("reduce-fraction"),
                description: String::from("reduce a fraction by its greatest common factor"),
            }],
            sets: vec![InvariantSet {
                id: String::from("fractions-generic"),
                description: String::from("fractions with any denominators"),
                rules: vec![InvariantRule {
                    id: String::from("fraction-reduction"),
                    invariant_set_id: String::new(),
                    description: String::from("reduce the fraction"),
                    priority: 10,
                    primitive_ids: vec![String::from("reduce-fraction")],
                    scenario_id: None,
                    teaching_tag: None,
                    predicate: Predicate::ReducibleFraction,
                }],
            }],
        }
    }

    #[test]
    fn builtin_table_loads() {
        let registry = Registry::builtin();
        assert!(registry.contains_primitive("same-denominator-add"));
        assert!(!registry.set_ids().is_empty());
    }

    #[test]
    fn loader_fills_set_ids() {
        let registry = Registry::load(minimal_table()).unwrap();
        let set = registry.get_invariant_set_by_id("fractions-generic").unwrap();
        assert_eq!(set.rules[0].invariant_set_id, "fractions-generic");
    }

    #[test]
    fn duplicate_primitive_rejected() {
        let mut table = minimal_table();
        table.primitives.push(table.primitives[0].clone());
        assert_eq!(
            Registry::load(table),
            Err(RegistryError::DuplicatePrimitive { id: String::from("reduce-fraction") }),
        );
    }

    #[test]
    fn unknown_primitive_rejected() {
        let mut table = minimal_table();
        table.sets[0].rules[0].primitive_ids.push(String::from("does-not-exist"));
        assert_eq!(
            Registry::load(table),
            Err(RegistryError::UnknownPrimitive {
                rule_id: String::from("fraction-reduction"),
                primitive_id: String::from("does-not-exist"),
            }),
        );
    }

    #[test]
    fn empty_primitives_rejected() {
        let mut table = minimal_table();
        table.sets[0].rules[0].primitive_ids.clear();
        assert_eq!(
            Registry::load(table),
            Err(RegistryError::EmptyPrimitives { rule_id: String::from("fraction-reduction") }),
        );
    }

    #[test]
    fn rules_are_found_by_primitive_id() {
        let registry = Registry::builtin();

        let rules = registry.find_rules_by_primitive_id("same-denominator-add");
        let ids: Vec<_> = rules.iter().map(|rule| rule.id.as_str()).collect();
        assert_eq!(ids, vec!["same-denominator-addition", "addition-via-common-denominator"]);

        assert!(registry.find_rules_by_primitive_id("does-not-exist").is_empty());
    }

    #[test]
    fn lookups_return_defensive_copies() {
        let registry = Registry::load(minimal_table()).unwrap();

        let mut set = registry.get_invariant_set_by_id("fractions-generic").unwrap();
        set.rules.clear();
        let mut primitive = registry.get_primitive_by_id("reduce-fraction").unwrap();
        primitive.description.clear();

        // the registry is unaffected by mutations of returned records
        assert_eq!(registry.get_invariant_set_by_id("fractions-generic").unwrap().rules.len(), 1);
        assert!(!registry.get_primitive_by_id("reduce-fraction").unwrap().description.is_empty());
    }
}
