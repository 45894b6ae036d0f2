//! ABOUTME: Expression Engine (C6): a curated, time-boxed JavaScript sandbox hosted on boa_engine
//! ABOUTME: Depends on rlm-session for state access and rlm-search for its regex helpers, per spec.md §2's dependency order

pub mod conv;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod host;
pub mod output;

pub mod prelude {
    pub use crate::engine::{execute, ExecutionOutcome};
    pub use crate::error::{Result, SandboxError};
    pub use crate::output::OutputBuffer;
}
