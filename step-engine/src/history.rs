//! Append-only step history, scoped to a session.
//!
//! The engine never reaches into ambient storage: a [`StepHistory`] is owned by the caller and
//! passed in by mutable reference for each step. How histories persist between calls is the
//! [`HistoryStore`] boundary; the engine ships an in-memory implementation and nothing else.
//!
//! Callers must serialize steps per session: appending and reading the newest entry is not
//! atomic across concurrent callers sharing one session id.

use crate::tree::NodePath;
use std::collections::HashMap;
use std::time::SystemTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single applied step. Entries are immutable once appended; an undo removes the newest
/// entry rather than editing it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepHistoryEntry {
    /// The id of the entry, increasing within a session.
    pub id: u64,

    /// When the step was applied.
    pub timestamp: SystemTime,

    /// The expression text before the step.
    pub expression_before: String,

    /// The expression text after the step.
    pub expression_after: String,

    /// The rule that was applied.
    pub invariant_rule_id: Option<String>,

    /// The path the rule was applied at, in the tree of `expression_before`.
    pub target: Option<NodePath>,

    /// The primitives that were executed, in order.
    pub primitive_ids: Option<Vec<String>>,
}

/// The fields of a step about to be recorded; the history assigns the id and timestamp.
#[derive(Debug, Clone)]
pub(crate) struct AppliedStep {
    pub expression_before: String,
    pub expression_after: String,
    pub invariant_rule_id: Option<String>,
    pub target: Option<NodePath>,
    pub primitive_ids: Option<Vec<String>>,
}

/// An append-only ordered log of applied steps for one session.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepHistory {
    entries: Vec<StepHistoryEntry>,
    next_id: u64,
}

impl StepHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded entries, oldest first.
    pub fn entries(&self) -> &[StepHistoryEntry] {
        &self.entries
    }

    /// The newest entry, the only one decision logic consults.
    pub fn last(&self) -> Option<&StepHistoryEntry> {
        self.entries.last()
    }

    /// The number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no steps have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a step, dropping the oldest entries beyond `max_depth`. The bound limits
    /// storage only; decision logic always looks at the newest entry.
    pub(crate) fn append(&mut self, step: AppliedStep, max_depth: usize) {
        self.entries.push(StepHistoryEntry {
            id: self.next_id,
            timestamp: SystemTime::now(),
            expression_before: step.expression_before,
            expression_after: step.expression_after,
            invariant_rule_id: step.invariant_rule_id,
            target: step.target,
            primitive_ids: step.primitive_ids,
        });
        self.next_id += 1;

        if self.entries.len() > max_depth {
            let excess = self.entries.len() - max_depth;
            self.entries.drain(..excess);
        }
    }

    /// Removes and returns the newest entry.
    pub(crate) fn pop(&mut self) -> Option<StepHistoryEntry> {
        self.entries.pop()
    }
}

/// Storage boundary for per-session histories. How a history persists between steps (memory,
/// file, database) is the implementor's concern.
pub trait HistoryStore {
    /// Returns the history for the session, or an empty one for a session never seen before.
    fn get(&self, session_id: &str) -> StepHistory;

    /// Stores the history for the session.
    fn put(&mut self, session_id: &str, history: StepHistory);
}

/// A [`HistoryStore`] backed by a map, for interactive use and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    sessions: HashMap<String, StepHistory>,
}

impl MemoryHistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn get(&self, session_id: &str) -> StepHistory {
        self.sessions.get(session_id).cloned().unwrap_or_default()
    }

    fn put(&mut self, session_id: &str, history: StepHistory) {
        self.sessions.insert(session_id.to_owned(), history);
    }
}
