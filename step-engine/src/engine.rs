//! The orchestrator: one entry point that runs the full step-decision sequence.
//!
//! `run_step` owns the sequence: parse, generate candidates, validate their primitive ids
//! against the registry, run the decision pipeline, execute the winning primitives in order,
//! and append to history. Everything before the history append is a pure function of its
//! inputs; a failure anywhere leaves the history untouched.
//!
//! Failures never cross this boundary as panics or bubbled-up internal errors: every outcome
//! is one of the typed statuses, with diagnostics attached as [`DebugInfo`].

use crate::{
    execute::{self, ExecError},
    generate::{generate, AnchorSelection, Candidate},
    history::{AppliedStep, HistoryStore, StepHistory},
    pipeline::{self, Decision, DecisionInput, StepPolicy},
    registry::Registry,
};
use step_parser::parser::{error::Error as ParseError, expr::Expr, Parser};

/// A request to apply one step to an expression.
#[derive(Debug, Clone)]
pub struct StepRequest {
    /// The expression text to step.
    pub expression: String,

    /// The learner's selection as a `term[0].term[1]` path, if any.
    pub selection_path: Option<String>,

    /// The learner's selection as an operator ordinal, if any. Ignored when `selection_path`
    /// is present.
    pub operator_index: Option<usize>,

    /// An explicitly requested primary primitive, e.g. when replaying a hint. Authoritative:
    /// if no candidate matches it, the step fails.
    pub preferred_primitive_id: Option<String>,

    /// The name of the policy to decide under.
    pub policy_name: String,
}

impl StepRequest {
    /// Creates a request with no selection under the student policy.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Self::default()
        }
    }
}

impl Default for StepRequest {
    fn default() -> Self {
        Self {
            expression: String::new(),
            selection_path: None,
            operator_index: None,
            preferred_primitive_id: None,
            policy_name: String::from("student"),
        }
    }
}

/// The status of a step request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// A candidate was selected and executed; the history gained an entry.
    StepApplied,

    /// The pipeline produced no winner, or a candidate failed primitive-id validation.
    NoCandidates,

    /// The expression failed to parse, an executor failed, or the request was malformed.
    EngineError,

    /// Reserved for a future multi-candidate disambiguation flow; never produced today.
    Choice,
}

/// Extra diagnostic information attached to a response.
#[derive(Debug)]
pub enum DebugInfo {
    /// A generated candidate referenced a primitive id missing from the registry. The guard
    /// fires before the pipeline runs: it means the candidate generator and the registry have
    /// drifted apart, and no step may be trusted until they agree again.
    InvalidPrimitiveId { invalid_id: String },

    /// The candidates that were generated but filtered away.
    RejectedCandidates { candidates: Vec<Candidate> },

    /// The expression failed to parse.
    ParseFailure { error: ParseError },

    /// A primitive executor failed.
    ExecutorFailure { error: ExecError },

    /// The request named a policy that does not exist.
    UnknownPolicy { name: String },
}

/// The response to a step request.
#[derive(Debug)]
pub struct StepResponse {
    /// What happened.
    pub status: StepStatus,

    /// The expression text after the step, when one was applied.
    pub new_expression: Option<String>,

    /// Diagnostics for callers that want them.
    pub debug: Option<DebugInfo>,
}

impl StepResponse {
    fn error(debug: DebugInfo) -> Self {
        Self {
            status: StepStatus::EngineError,
            new_expression: None,
            debug: Some(debug),
        }
    }

    fn no_candidates(debug: DebugInfo) -> Self {
        Self {
            status: StepStatus::NoCandidates,
            new_expression: None,
            debug: Some(debug),
        }
    }
}

/// Returns the first primitive id referenced by a candidate but missing from the registry.
fn find_invalid_primitive<'a>(registry: &Registry, candidates: &'a [Candidate]) -> Option<&'a str> {
    candidates
        .iter()
        .flat_map(|candidate| &candidate.primitive_ids)
        .map(String::as_str)
        .find(|id| !registry.contains_primitive(id))
}

/// The step-decision engine.
///
/// The engine owns the validated rule catalog it was constructed with; per-session histories
/// are owned by the caller and passed in for each step. The registry is read-only after load,
/// so one engine may serve any number of sessions — but steps for a single session must be
/// serialized by the caller, because appending to that session's history and reading its
/// newest entry is not atomic across concurrent callers.
#[derive(Debug, Clone)]
pub struct StepEngine {
    registry: Registry,
}

impl StepEngine {
    /// Creates an engine over the given registry.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// The engine's rule catalog.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs a single step against the given session history.
    pub fn run_step(&self, history: &mut StepHistory, request: &StepRequest) -> StepResponse {
        let Some(policy) = StepPolicy::named(&request.policy_name) else {
            return StepResponse::error(DebugInfo::UnknownPolicy {
                name: request.policy_name.clone(),
            });
        };

        let tree = match Parser::new(&request.expression).try_parse_full::<Expr>() {
            Ok(tree) => tree,
            Err(error) => return StepResponse::error(DebugInfo::ParseFailure { error }),
        };

        let selection = match (&request.selection_path, request.operator_index) {
            (Some(path), _) => AnchorSelection::Path(path.clone()),
            (None, Some(index)) => AnchorSelection::OperatorOrdinal(index),
            (None, None) => AnchorSelection::WholeExpression,
        };

        let set_ids = self.registry.set_ids();
        let generated = generate(&self.registry, &tree, &selection, &set_ids);

        // defensive guard: the generator and the registry must agree on every primitive id
        // before the pipeline is allowed to pick anything
        if let Some(invalid_id) = find_invalid_primitive(&self.registry, &generated.candidates) {
            return StepResponse::no_candidates(DebugInfo::InvalidPrimitiveId {
                invalid_id: invalid_id.to_owned(),
            });
        }

        let decision = pipeline::decide(DecisionInput {
            candidates: generated.candidates.clone(),
            history,
            policy: &policy,
            action_target: generated.resolved_anchor.as_ref(),
            preferred_primitive: request.preferred_primitive_id.as_deref(),
        });

        let chosen = match decision {
            Decision::Chosen(candidate) => candidate,
            Decision::NoCandidates => {
                return StepResponse::no_candidates(DebugInfo::RejectedCandidates {
                    candidates: generated.candidates,
                });
            },
        };

        // a candidate may bundle a preparatory primitive before its primary one; run them in
        // order, leaving the history untouched if any of them fails
        let mut current = tree;
        for primitive_id in &chosen.primitive_ids {
            current = match execute::apply_primitive(primitive_id, &current, &chosen.target) {
                Ok(tree) => tree,
                Err(error) => return StepResponse::error(DebugInfo::ExecutorFailure { error }),
            };
        }

        let new_expression = current.to_string();
        history.append(
            AppliedStep {
                expression_before: request.expression.clone(),
                expression_after: new_expression.clone(),
                invariant_rule_id: Some(chosen.invariant_rule_id.clone()),
                target: Some(chosen.target.clone()),
                primitive_ids: Some(chosen.primitive_ids.clone()),
            },
            policy.max_history_depth,
        );

        StepResponse {
            status: StepStatus::StepApplied,
            new_expression: Some(new_expression),
            debug: None,
        }
    }

    /// Runs a single step for a session held in a [`HistoryStore`].
    pub fn run_step_for_session(
        &self,
        store: &mut dyn HistoryStore,
        session_id: &str,
        request: &StepRequest,
    ) -> StepResponse {
        let mut history = store.get(session_id);
        let response = self.run_step(&mut history, request);
        store.put(session_id, history);
        response
    }

    /// Undoes the most recent step by removing its history entry, returning the expression
    /// text from before that step. The pipeline is never re-run.
    pub fn undo(&self, history: &mut StepHistory) -> Option<String> {
        history.pop().map(|entry| entry.expression_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::table;
    use pretty_assertions::assert_eq;

    fn engine() -> StepEngine {
        StepEngine::new(Registry::builtin())
    }

    fn step(engine: &StepEngine, history: &mut StepHistory, request: StepRequest) -> StepResponse {
        engine.run_step(history, &request)
    }

    #[test]
    fn common_denominator_addition() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("1/3 + 2/5"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("11/15"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn same_denominator_addition() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("1/3 + 2/3"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("3/3"));
    }

    #[test]
    fn same_denominator_subtraction() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("5/7 - 2/7"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("3/7"));

        let entry = history.last().unwrap();
        assert_eq!(
            entry.primitive_ids.as_deref(),
            Some(&[table::SAME_DENOMINATOR_SUBTRACT.to_owned()][..]),
        );
    }

    #[test]
    fn integer_normalization_at_the_selected_operand() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest {
            expression: String::from("3 + 2/5"),
            selection_path: Some(String::from("term[0]")),
            ..StepRequest::default()
        });
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("3/1 + 2/5"));
    }

    #[test]
    fn locality_rejects_steps_away_from_the_selection() {
        let engine = engine();
        let mut history = StepHistory::new();

        // the only candidate targets the integer operand at term[0]; selecting the fraction
        // at term[1] must not apply it
        let response = step(&engine, &mut history, StepRequest {
            expression: String::from("3 + 2/5"),
            selection_path: Some(String::from("term[1]")),
            ..StepRequest::default()
        });
        assert_eq!(response.status, StepStatus::NoCandidates);
        assert!(matches!(response.debug, Some(DebugInfo::RejectedCandidates { .. })));
        assert!(history.is_empty());
    }

    #[test]
    fn teacher_policy_ignores_locality() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest {
            expression: String::from("3 + 2/5"),
            selection_path: Some(String::from("term[1]")),
            policy_name: String::from("teacher"),
            ..StepRequest::default()
        });
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("3/1 + 2/5"));
    }

    #[test]
    fn repetition_blocks_the_same_rule_at_the_same_target() {
        let engine = engine();
        let mut history = StepHistory::new();

        let first = step(&engine, &mut history, StepRequest::new("1/3 + 2/5"));
        assert_eq!(first.status, StepStatus::StepApplied);

        // asking to re-derive the very same step is an oscillation; the student policy
        // rejects it
        let second = step(&engine, &mut history, StepRequest::new("1/3 + 2/5"));
        assert_eq!(second.status, StepStatus::NoCandidates);

        // the teacher policy permits it
        let third = step(&engine, &mut history, StepRequest {
            expression: String::from("1/3 + 2/5"),
            policy_name: String::from("teacher"),
            ..StepRequest::default()
        });
        assert_eq!(third.status, StepStatus::StepApplied);
    }

    #[test]
    fn preferred_primitive_is_never_overridden() {
        let engine = engine();
        let mut history = StepHistory::new();

        // a direct candidate exists, but the caller insists on a primitive no candidate
        // carries as its primary
        let response = step(&engine, &mut history, StepRequest {
            expression: String::from("1/3 + 2/3"),
            preferred_primitive_id: Some(String::from(table::FRACTION_MULTIPLY)),
            ..StepRequest::default()
        });
        assert_eq!(response.status, StepStatus::NoCandidates);

        let response = step(&engine, &mut history, StepRequest {
            expression: String::from("1/3 + 2/3"),
            preferred_primitive_id: Some(String::from(table::SAME_DENOMINATOR_ADD)),
            ..StepRequest::default()
        });
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("3/3"));
    }

    #[test]
    fn parse_failure_is_an_engine_error_without_history() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("1/0 + 2/5"));
        assert_eq!(response.status, StepStatus::EngineError);
        assert!(matches!(response.debug, Some(DebugInfo::ParseFailure { .. })));
        assert!(history.is_empty());
    }

    #[test]
    fn unknown_policy_is_an_engine_error() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest {
            expression: String::from("1/3 + 2/5"),
            policy_name: String::from("grader"),
            ..StepRequest::default()
        });
        assert_eq!(response.status, StepStatus::EngineError);
        assert!(matches!(response.debug, Some(DebugInfo::UnknownPolicy { .. })));
    }

    #[test]
    fn invalid_primitive_id_aborts_before_the_pipeline() {
        // simulate generator/registry drift by removing a primitive after load
        let mut registry = Registry::builtin();
        registry.primitives.remove(table::SAME_DENOMINATOR_SUBTRACT);
        let engine = StepEngine::new(registry);
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("5/7 - 2/7"));
        assert_eq!(response.status, StepStatus::NoCandidates);
        match response.debug {
            Some(DebugInfo::InvalidPrimitiveId { invalid_id }) => {
                assert_eq!(invalid_id, table::SAME_DENOMINATOR_SUBTRACT);
            },
            other => panic!("expected invalid-primitive-id debug info, got {:?}", other),
        }
        assert!(history.is_empty());
    }

    #[test]
    fn mixed_number_expansion() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("1 2/3 + 1/3"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("5/3 + 1/3"));

        let response = step(&engine, &mut history, StepRequest::new("5/3 + 1/3"));
        assert_eq!(response.new_expression.as_deref(), Some("6/3"));

        let response = step(&engine, &mut history, StepRequest::new("6/3"));
        assert_eq!(response.new_expression.as_deref(), Some("2"));
    }

    #[test]
    fn integer_window_arithmetic() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("3 + 4"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("7"));
    }

    #[test]
    fn step_inside_a_group() {
        let engine = engine();
        let mut history = StepHistory::new();

        let response = step(&engine, &mut history, StepRequest::new("(1 + 5) / 2"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(response.new_expression.as_deref(), Some("(6) / 2"));

        let response = step(&engine, &mut history, StepRequest::new("(6) / 2"));
        assert_eq!(response.new_expression.as_deref(), Some("3"));
    }

    #[test]
    fn undo_restores_the_previous_expression() {
        let engine = engine();
        let mut history = StepHistory::new();

        step(&engine, &mut history, StepRequest::new("1/3 + 2/5"));
        assert_eq!(history.len(), 1);

        assert_eq!(engine.undo(&mut history).as_deref(), Some("1/3 + 2/5"));
        assert!(history.is_empty());
        assert_eq!(engine.undo(&mut history), None);
    }

    #[test]
    fn session_store_round_trip() {
        use crate::history::{HistoryStore, MemoryHistoryStore};

        let engine = engine();
        let mut store = MemoryHistoryStore::new();

        let response = engine.run_step_for_session(&mut store, "session-1", &StepRequest::new("1/3 + 2/5"));
        assert_eq!(response.status, StepStatus::StepApplied);
        assert_eq!(store.get("session-1").len(), 1);
        assert!(store.get("session-2").is_empty());
    }

    #[test]
    fn find_invalid_primitive_reports_the_first_unknown_id() {
        use crate::generate::CandidateCategory;
        use crate::tree::NodePath;

        let registry = Registry::builtin();
        let candidates = vec![Candidate {
            id: 0,
            invariant_rule_id: String::from("rule"),
            primitive_ids: vec![
                String::from(table::SAME_DENOMINATOR_ADD),
                String::from("phantom-primitive"),
            ],
            target: NodePath::root(),
            description: String::new(),
            category: CandidateCategory::Direct,
        }];

        assert_eq!(find_invalid_primitive(&registry, &candidates), Some("phantom-primitive"));
        assert_eq!(find_invalid_primitive(&registry, &candidates[..0].to_vec()), None);
    }
}
