//! ABOUTME: A single session's in-memory state: contexts, variables, decompositions, history, answer
//! ABOUTME: Owned exclusively behind the registry's per-session lock; never accessed unlocked

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use rlm_core::types::{AnswerState, Context, DecompositionRecord, Value};

use crate::types::{ExecutionRecord, SessionStats};

/// The state owned by one session, guarded by the registry's per-session
/// `RwLock`. Never cloned wholesale; callers read/write through the
/// registry's operations.
#[derive(Debug)]
pub struct SessionInner {
    pub id: String,
    pub contexts: HashMap<String, Context>,
    pub variables: HashMap<String, Value>,
    pub history: VecDeque<ExecutionRecord>,
    pub decompositions: HashMap<String, DecompositionRecord>,
    /// context id -> most recent decompose_id for that context
    pub last_decompose_per_context: HashMap<String, String>,
    /// the single most recently created decompose_id across all contexts
    pub last_decompose_global: Option<String>,
    pub answer: AnswerState,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub history_cap: usize,
}

impl SessionInner {
    #[must_use]
    pub fn new(id: String, history_cap: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            contexts: HashMap::new(),
            variables: HashMap::new(),
            history: VecDeque::new(),
            decompositions: HashMap::new(),
            last_decompose_per_context: HashMap::new(),
            last_decompose_global: None,
            answer: AnswerState::default(),
            created_at: now,
            last_activity: now,
            history_cap,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn push_history(&mut self, record: ExecutionRecord) {
        self.history.push_back(record);
        while self.history.len() > self.history_cap {
            self.history.pop_front();
        }
    }

    pub fn record_decomposition(&mut self, record: DecompositionRecord) {
        self.last_decompose_per_context
            .insert(record.context_id.clone(), record.id.clone());
        self.last_decompose_global = Some(record.id.clone());
        self.decompositions.insert(record.id.clone(), record);
    }

    /// Estimated memory footprint across contexts and variables, used only
    /// for admission control.
    #[must_use]
    pub fn estimated_memory_bytes(&self) -> usize {
        let context_bytes: usize = self
            .contexts
            .values()
            .map(|c| rlm_core::memory::estimate_string_bytes(&c.content))
            .sum();
        let variable_bytes: usize = self
            .variables
            .values()
            .map(rlm_core::memory::estimate_value_bytes)
            .sum();
        context_bytes + variable_bytes
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            id: self.id.clone(),
            context_count: self.contexts.len(),
            variable_count: self.variables.len(),
            history_count: self.history.len(),
            estimated_memory_bytes: self.estimated_memory_bytes(),
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }
}
