//! One-step arithmetic simplification for learners.
//!
//! This crate decides and applies *single* algebraic simplification steps over arithmetic
//! expressions (integers, fractions, mixed numbers): parse the expression into a tree, match an
//! immutable catalog of rules against it, pick at most one winning candidate under a
//! pedagogical policy, execute the winning transformation, and record what happened for
//! repetition checks on subsequent steps.
//!
//! The pieces, in the order a step flows through them:
//!
//! - [`registry`] — the rule catalog, loaded once from a declarative table and validated
//!   fail-fast.
//! - [`tree`] — index-path addressing and pure tree surgery over the parsed expression.
//! - [`generate`] — walks the tree, evaluates every rule's predicate, and emits candidates.
//! - [`pipeline`] — filters candidates (locality, repetition, preferred primitive) and picks
//!   the first survivor.
//! - [`execute`] — the primitive executors, pure transforms with exact integer arithmetic.
//! - [`history`] — per-session append-only logs and the storage boundary around them.
//! - [`engine`] — the orchestrator tying the sequence together behind one typed entry point.

pub mod engine;
pub mod execute;
pub mod generate;
pub mod history;
pub mod pipeline;
pub mod primitive;
pub mod registry;
pub mod tree;

pub use engine::{DebugInfo, StepEngine, StepRequest, StepResponse, StepStatus};
pub use generate::{AnchorSelection, Candidate, CandidateCategory};
pub use history::{HistoryStore, MemoryHistoryStore, StepHistory, StepHistoryEntry};
pub use pipeline::StepPolicy;
pub use registry::{Registry, RegistryError, RegistryTable};
