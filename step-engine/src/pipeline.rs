//! The decision pipeline: filtering candidates under a policy and selecting at most one winner.
//!
//! Filters run in a fixed order — locality, repetition, preferred primitive — and the pipeline
//! short-circuits to "no candidates" as soon as the list is empty. The selector is
//! first-applicable: the first candidate surviving the filters, in generation order, wins.

use crate::{generate::Candidate, history::StepHistory, tree::NodePath};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable configuration for how steps are selected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepPolicy {
    /// The name of the policy.
    pub name: String,

    /// Whether a step may repeat the most recent (rule, target) pair.
    pub allow_repetition: bool,

    /// How many history entries to retain per session. Bounds storage only; decision logic
    /// always consults just the newest entry.
    pub max_history_depth: usize,

    /// Whether candidates must target exactly the node the learner selected.
    pub locality_enforcement: bool,
}

impl StepPolicy {
    /// The strict policy for learners: repetition forbidden, locality enforced.
    pub fn student() -> Self {
        Self {
            name: String::from("student"),
            allow_repetition: false,
            max_history_depth: 100,
            locality_enforcement: true,
        }
    }

    /// The permissive policy for teachers demonstrating steps.
    pub fn teacher() -> Self {
        Self {
            name: String::from("teacher"),
            allow_repetition: true,
            max_history_depth: 1000,
            locality_enforcement: false,
        }
    }

    /// Looks up a policy by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "student" => Some(Self::student()),
            "teacher" => Some(Self::teacher()),
            _ => None,
        }
    }
}

/// Everything the pipeline consults to decide on a step.
#[derive(Debug)]
pub struct DecisionInput<'a> {
    /// The candidates, in generation order.
    pub candidates: Vec<Candidate>,

    /// The session's history; only the newest entry is consulted.
    pub history: &'a StepHistory,

    /// The policy in effect.
    pub policy: &'a StepPolicy,

    /// The node the learner selected, when locality applies.
    pub action_target: Option<&'a NodePath>,

    /// An explicitly requested primary primitive, e.g. when replaying a hint.
    pub preferred_primitive: Option<&'a str>,
}

/// The outcome of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A single winning candidate.
    Chosen(Candidate),

    /// No candidate survived filtering.
    NoCandidates,
}

/// Runs the filter chain and selects at most one winning candidate.
pub fn decide(input: DecisionInput) -> Decision {
    let DecisionInput { mut candidates, history, policy, action_target, preferred_primitive } = input;

    // locality: when the learner pointed at a node, only steps exactly there may apply
    if policy.locality_enforcement {
        if let Some(target) = action_target {
            candidates.retain(|candidate| &candidate.target == target);
            if candidates.is_empty() {
                return Decision::NoCandidates;
            }
        }
    }

    // repetition: a one-step lookback against the newest history entry; the same rule at a
    // different target is still allowed
    if !policy.allow_repetition {
        if let Some(last) = history.last() {
            candidates.retain(|candidate| {
                last.invariant_rule_id.as_deref() != Some(candidate.invariant_rule_id.as_str())
                    || last.target.as_ref() != Some(&candidate.target)
            });
            if candidates.is_empty() {
                return Decision::NoCandidates;
            }
        }
    }

    // an explicit primitive choice is authoritative: filtering down to nothing fails the step
    // rather than falling back to other candidates
    if let Some(preferred) = preferred_primitive {
        candidates.retain(|candidate| {
            candidate.primitive_ids.first().is_some_and(|id| id == preferred)
        });
    }

    match candidates.into_iter().next() {
        Some(candidate) => Decision::Chosen(candidate),
        None => Decision::NoCandidates,
    }
}
