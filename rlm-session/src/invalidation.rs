//! ABOUTME: The invalidation seam coordinated Session Registry mutations call into
//! ABOUTME: Chunk/index/query caches register themselves here without rlm-session depending on them

/// Implemented by each downstream cache (chunk cache, index cache, query
/// cache) so the Session Registry can invalidate all of them, in
/// registration order, before a mutated Context becomes observable.
///
/// Implementations MUST be idempotent and safe to call under a session's
/// write lock, per the session's concurrency model.
pub trait CacheInvalidate: Send + Sync {
    /// Drops every cached entry keyed with the given (session, context)
    /// prefix. Called with the *old* context id on unload/destroy and with
    /// the mutated context's id on load/append.
    fn invalidate_prefix(&self, session_id: &str, context_id: &str);

    /// Drops every cached entry for an entire session (used by session
    /// eviction and `clear`/`destroy`).
    fn invalidate_session(&self, session_id: &str);
}
