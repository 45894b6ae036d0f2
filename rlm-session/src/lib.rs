//! ABOUTME: Session Registry and Context Store: the process-wide store of isolated sessions
//! ABOUTME: Every other component crate reaches session/context state only through `SessionRegistry`

pub mod context_store;
pub mod error;
pub mod invalidation;
pub mod persistence;
pub mod registry;
pub mod session;
pub mod types;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::error::{Result, SessionError};
    pub use crate::invalidation::CacheInvalidate;
    pub use crate::persistence::{FilePersistence, NullPersistence, PersistedContext, PersistenceProvider};
    pub use crate::registry::SessionRegistry;
    pub use crate::session::SessionInner;
    pub use crate::types::{AppendMode, ExecutionRecord, SessionStats};
}
