//! ABOUTME: Shared data model, error envelope and layered configuration for the RLM context server
//! ABOUTME: Depended on by every other rlm-* crate; carries no business logic of its own

pub mod config;
pub mod envelope;
pub mod hash;
pub mod ids;
pub mod memory;
pub mod redos;
pub mod types;

pub mod prelude {
    pub use crate::config::RlmConfig;
    pub use crate::envelope::{ErrorCode, ErrorEnvelope};
    pub use crate::hash::content_fingerprint;
    pub use crate::ids::{validate_context_id, validate_variable_name, SessionId};
    pub use crate::memory::estimate_value_bytes;
    pub use crate::types::{
        AnswerState, Chunk, Context, ContextMetadata, DecompositionRecord, Structure, Value,
    };
}
