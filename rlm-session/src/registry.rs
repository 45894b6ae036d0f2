//! ABOUTME: Session Registry: creation, quotas, TTL/LRU eviction and coordinated cache invalidation
//! ABOUTME: Each session is its own serialization domain behind a per-session tokio RwLock

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock as SyncRwLock;
use rlm_core::config::RlmConfig;
use rlm_core::ids::{validate_context_id, validate_variable_name, SessionId, DEFAULT_SESSION};
use rlm_core::types::{AnswerState, Context, DecompositionRecord, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context_store::derive_metadata;
use crate::error::{Result, SessionError};
use crate::invalidation::CacheInvalidate;
use crate::persistence::{NullPersistence, PersistenceProvider};
use crate::session::SessionInner;
use crate::types::{AppendMode, ExecutionRecord, SessionStats};

type SessionHandle = Arc<RwLock<SessionInner>>;

/// Process-wide store of isolated sessions.
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    config: Arc<RlmConfig>,
    caches: SyncRwLock<Vec<Arc<dyn CacheInvalidate>>>,
    persistence: Arc<dyn PersistenceProvider>,
    sessions_created: AtomicU64,
    sessions_evicted: AtomicU64,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(config: Arc<RlmConfig>) -> Arc<Self> {
        Self::with_persistence(config, Arc::new(NullPersistence))
    }

    #[must_use]
    pub fn with_persistence(config: Arc<RlmConfig>, persistence: Arc<dyn PersistenceProvider>) -> Arc<Self> {
        let registry = Arc::new(Self {
            sessions: DashMap::new(),
            config,
            caches: SyncRwLock::new(Vec::new()),
            persistence,
            sessions_created: AtomicU64::new(0),
            sessions_evicted: AtomicU64::new(0),
        });
        registry.ensure_default_session();
        registry
    }

    fn ensure_default_session(&self) {
        self.sessions.entry(DEFAULT_SESSION.to_string()).or_insert_with(|| {
            Arc::new(RwLock::new(SessionInner::new(
                DEFAULT_SESSION.to_string(),
                self.config.session.max_history_depth,
            )))
        });
    }

    /// Registers a downstream cache for coordinated invalidation.
    /// Caches MUST be registered in the order chunk-cache, index-cache,
    /// query-cache to match the invalidation ordering invariant.
    pub fn register_cache(&self, cache: Arc<dyn CacheInvalidate>) {
        self.caches.write().push(cache);
    }

    fn invalidate_context(&self, session_id: &str, context_id: &str) {
        for cache in self.caches.read().iter() {
            cache.invalidate_prefix(session_id, context_id);
        }
    }

    fn invalidate_session(&self, session_id: &str) {
        for cache in self.caches.read().iter() {
            cache.invalidate_session(session_id);
        }
    }

    /// Runs a full context save on a blocking-pool thread so the file I/O in
    /// `PersistenceProvider` impls never occupies a tokio worker thread.
    /// Failures are logged, not propagated: persistence is best-effort and
    /// must never fail the RPC call that triggered it.
    async fn save_context_blocking(&self, session_id: String, context_id: String, ctx: Context) {
        let persistence = self.persistence.clone();
        let result = tokio::task::spawn_blocking(move || {
            persistence.save(&session_id, &context_id, &ctx.content, &ctx.metadata, ctx.created_at)
        })
        .await;
        match result {
            Ok(Err(err)) => warn!(error = %err, "failed to persist context"),
            Err(err) => warn!(error = %err, "persistence task panicked"),
            Ok(Ok(())) => {}
        }
    }

    /// Same blocking-pool deferral as `save_context_blocking`, for snapshots.
    async fn save_snapshot_blocking(&self, session_id: String, context_id: String, content: String, created_at: chrono::DateTime<Utc>) {
        let persistence = self.persistence.clone();
        let result =
            tokio::task::spawn_blocking(move || persistence.save_snapshot(&session_id, &context_id, &content, created_at)).await;
        match result {
            Ok(Err(err)) => warn!(error = %err, "failed to persist context snapshot"),
            Err(err) => warn!(error = %err, "persistence snapshot task panicked"),
            Ok(Ok(())) => {}
        }
    }

    /// Spawns the background scavenger that evicts idle non-default
    /// sessions every `scavenger_interval_secs`.
    pub fn spawn_scavenger(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval_secs = registry.config.session.scavenger_interval_secs.max(1);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                registry.sweep_expired().await;
            }
        })
    }

    async fn sweep_expired(&self) {
        let ttl = chrono::Duration::seconds(self.config.session.session_ttl_secs as i64);
        let now = Utc::now();
        let mut expired = Vec::new();
        for entry in self.sessions.iter() {
            if entry.key() == DEFAULT_SESSION {
                continue;
            }
            let last_activity = entry.value().read().await.last_activity;
            if now - last_activity > ttl {
                expired.push(entry.key().clone());
            }
        }
        for id in expired {
            self.sessions.remove(&id);
            self.invalidate_session(&id);
            self.sessions_evicted.fetch_add(1, Ordering::Relaxed);
            debug!(session_id = %id, "evicted idle session (TTL expired)");
        }
    }

    async fn evict_lru_if_at_capacity(&self) {
        let max = self.config.session.max_sessions;
        // -1 because `default` always occupies one slot but is never evicted.
        if self.sessions.len() < max.max(1) {
            return;
        }
        let mut oldest: Option<(String, chrono::DateTime<Utc>)> = None;
        for entry in self.sessions.iter() {
            if entry.key() == DEFAULT_SESSION {
                continue;
            }
            let last_activity = entry.value().read().await.last_activity;
            if oldest.as_ref().map_or(true, |(_, t)| last_activity < *t) {
                oldest = Some((entry.key().clone(), last_activity));
            }
        }
        if let Some((id, _)) = oldest {
            self.sessions.remove(&id);
            self.invalidate_session(&id);
            self.sessions_evicted.fetch_add(1, Ordering::Relaxed);
            warn!(session_id = %id, "evicted LRU session at capacity");
        }
    }

    pub async fn create_session(self: &Arc<Self>) -> Result<SessionId> {
        self.evict_lru_if_at_capacity().await;
        let id = SessionId::new();
        self.sessions.insert(
            id.as_str().to_string(),
            Arc::new(RwLock::new(SessionInner::new(
                id.as_str().to_string(),
                self.config.session.max_history_depth,
            ))),
        );
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
        info!(session_id = %id, "session created");
        Ok(id)
    }

    /// Resolves an optional caller-supplied session id to a live handle,
    /// creating the distinguished `default` session lazily and failing with
    /// `SessionExpired`/`SessionNotFound` otherwise.
    async fn resolve(&self, id: Option<&str>) -> Result<(String, SessionHandle)> {
        let id = id.map(str::to_string).unwrap_or_else(|| DEFAULT_SESSION.to_string());
        if id == DEFAULT_SESSION {
            self.ensure_default_session();
        }
        let handle = self
            .sessions
            .get(&id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| SessionError::SessionNotFound { id: id.clone() })?;

        if id != DEFAULT_SESSION {
            let ttl = chrono::Duration::seconds(self.config.session.session_ttl_secs as i64);
            let last_activity = handle.read().await.last_activity;
            if Utc::now() - last_activity > ttl {
                self.sessions.remove(&id);
                self.invalidate_session(&id);
                return Err(SessionError::SessionExpired { id });
            }
        }
        Ok((id, handle))
    }

    pub async fn stats(&self, id: Option<&str>) -> Result<SessionStats> {
        let (_, handle) = self.resolve(id).await?;
        let guard = handle.read().await;
        Ok(guard.stats())
    }

    pub async fn load(&self, session_id: Option<&str>, context_id: &str, text: String) -> Result<Context> {
        validate_context_id(context_id).map_err(|message| SessionError::InvalidInput { message })?;
        if text.len() > self.config.session.max_context_bytes {
            return Err(SessionError::ContextTooLarge {
                id: context_id.to_string(),
                cap: self.config.session.max_context_bytes,
            });
        }

        let (sid, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();

        let previous = guard.contexts.get(context_id).cloned();
        let is_new = previous.is_none();
        if is_new && guard.contexts.len() >= self.config.session.max_contexts_per_session {
            return Err(SessionError::VariableLimitExceeded {
                message: format!(
                    "context count would exceed cap of {}",
                    self.config.session.max_contexts_per_session
                ),
            });
        }

        let prospective_bytes = guard.estimated_memory_bytes()
            - previous
                .as_ref()
                .map(|c| rlm_core::memory::estimate_string_bytes(&c.content))
                .unwrap_or(0)
            + rlm_core::memory::estimate_string_bytes(&text);
        if prospective_bytes > self.config.session.max_session_memory_bytes {
            return Err(SessionError::SessionMemoryExceeded {
                cap: self.config.session.max_session_memory_bytes,
            });
        }

        let metadata = derive_metadata(&text);
        let created_at = previous.as_ref().map_or_else(Utc::now, |c| c.created_at);

        // M1(a): snapshot prior content before it is overwritten.
        if let Some(prev) = &previous {
            if self.config.session.snapshots_enabled && self.persistence.is_enabled() {
                self.save_snapshot_blocking(sid.clone(), context_id.to_string(), prev.content.clone(), Utc::now()).await;
            }
        }
        // M1(b,c,d): invalidate all downstream caches before publishing.
        self.invalidate_context(&sid, context_id);

        // M1(e): publish the new context.
        let new_context = Context {
            id: context_id.to_string(),
            content: text,
            metadata,
            created_at,
        };
        guard.contexts.insert(context_id.to_string(), new_context.clone());
        drop(guard);

        if self.persistence.is_enabled() {
            self.save_context_blocking(sid, context_id.to_string(), new_context.clone()).await;
        }

        Ok(new_context)
    }

    pub async fn append(
        &self,
        session_id: Option<&str>,
        context_id: &str,
        text: &str,
        mode: AppendMode,
        create_if_missing: bool,
    ) -> Result<Context> {
        validate_context_id(context_id).map_err(|message| SessionError::InvalidInput { message })?;

        let (sid, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();

        let previous = guard.contexts.get(context_id).cloned();
        if previous.is_none() && !create_if_missing {
            return Err(SessionError::ContextNotFound {
                id: context_id.to_string(),
            });
        }

        let new_content = match &previous {
            Some(ctx) => match mode {
                AppendMode::Append => format!("{}{}", ctx.content, text),
                AppendMode::Prepend => format!("{}{}", text, ctx.content),
            },
            None => text.to_string(),
        };

        if new_content.len() > self.config.session.max_context_bytes {
            return Err(SessionError::ContextTooLarge {
                id: context_id.to_string(),
                cap: self.config.session.max_context_bytes,
            });
        }

        let is_new = previous.is_none();
        if is_new && guard.contexts.len() >= self.config.session.max_contexts_per_session {
            return Err(SessionError::VariableLimitExceeded {
                message: format!(
                    "context count would exceed cap of {}",
                    self.config.session.max_contexts_per_session
                ),
            });
        }

        let prospective_bytes = guard.estimated_memory_bytes()
            - previous
                .as_ref()
                .map(|c| rlm_core::memory::estimate_string_bytes(&c.content))
                .unwrap_or(0)
            + rlm_core::memory::estimate_string_bytes(&new_content);
        if prospective_bytes > self.config.session.max_session_memory_bytes {
            // Atomicity (A1): fail and leave the prior Context intact.
            return Err(SessionError::SessionMemoryExceeded {
                cap: self.config.session.max_session_memory_bytes,
            });
        }

        let metadata = derive_metadata(&new_content);
        let created_at = previous.as_ref().map_or_else(Utc::now, |c| c.created_at);

        if let Some(prev) = &previous {
            if self.config.session.snapshots_enabled && self.persistence.is_enabled() {
                self.save_snapshot_blocking(sid.clone(), context_id.to_string(), prev.content.clone(), Utc::now()).await;
            }
        }
        self.invalidate_context(&sid, context_id);

        let new_context = Context {
            id: context_id.to_string(),
            content: new_content,
            metadata,
            created_at,
        };
        guard.contexts.insert(context_id.to_string(), new_context.clone());
        drop(guard);

        if self.persistence.is_enabled() {
            self.save_context_blocking(sid, context_id.to_string(), new_context.clone()).await;
        }

        Ok(new_context)
    }

    pub async fn get_context(&self, session_id: Option<&str>, context_id: &str) -> Result<Context> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        guard
            .contexts
            .get(context_id)
            .cloned()
            .ok_or_else(|| SessionError::ContextNotFound {
                id: context_id.to_string(),
            })
    }

    pub async fn list_contexts(&self, session_id: Option<&str>) -> Result<Vec<String>> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        Ok(guard.contexts.keys().cloned().collect())
    }

    pub async fn unload(&self, session_id: Option<&str>, context_id: &str) -> Result<()> {
        let (sid, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        let removed = guard.contexts.remove(context_id);
        guard.last_decompose_per_context.remove(context_id);
        drop(guard);

        if let Some(ctx) = removed {
            if self.persistence.is_enabled() {
                // Flush current content to durable storage before it leaves
                // live memory; does not delete any existing persisted copy.
                self.save_context_blocking(sid.clone(), context_id.to_string(), ctx).await;
            }
        }
        self.invalidate_context(&sid, context_id);
        Ok(())
    }

    pub async fn set_variable(&self, session_id: Option<&str>, name: &str, value: Value) -> Result<()> {
        validate_variable_name(name).map_err(|message| SessionError::InvalidInput { message })?;
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();

        let is_new = !guard.variables.contains_key(name);
        if is_new && guard.variables.len() >= self.config.session.max_variables_per_session {
            return Err(SessionError::VariableLimitExceeded {
                message: format!(
                    "variable count would exceed cap of {}",
                    self.config.session.max_variables_per_session
                ),
            });
        }

        let prospective_bytes = guard.estimated_memory_bytes()
            - guard
                .variables
                .get(name)
                .map(rlm_core::memory::estimate_value_bytes)
                .unwrap_or(0)
            + rlm_core::memory::estimate_value_bytes(&value);
        if prospective_bytes > self.config.session.max_session_memory_bytes {
            return Err(SessionError::SessionMemoryExceeded {
                cap: self.config.session.max_session_memory_bytes,
            });
        }

        guard.variables.insert(name.to_string(), value);
        Ok(())
    }

    pub async fn get_variable(&self, session_id: Option<&str>, name: &str) -> Result<Option<Value>> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        Ok(guard.variables.get(name).cloned())
    }

    pub async fn delete_variable(&self, session_id: Option<&str>, name: &str) -> Result<()> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        guard.variables.remove(name);
        Ok(())
    }

    pub async fn list_variables(&self, session_id: Option<&str>) -> Result<HashMap<String, Value>> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        Ok(guard.variables.clone())
    }

    pub async fn set_answer(&self, session_id: Option<&str>, content: String, ready: bool) -> Result<()> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        guard.answer = AnswerState { content, ready };
        Ok(())
    }

    pub async fn append_answer(&self, session_id: Option<&str>, content: &str) -> Result<AnswerState> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        guard.answer.content.push_str(content);
        Ok(guard.answer.clone())
    }

    pub async fn get_answer(&self, session_id: Option<&str>) -> Result<AnswerState> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        Ok(guard.answer.clone())
    }

    pub async fn store_decomposition(
        &self,
        session_id: Option<&str>,
        context_id: &str,
        strategy: &str,
        options: Value,
    ) -> Result<DecompositionRecord> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();
        guard
            .contexts
            .get(context_id)
            .ok_or_else(|| SessionError::ContextNotFound {
                id: context_id.to_string(),
            })?;
        let record = DecompositionRecord {
            id: Uuid::new_v4().to_string(),
            context_id: context_id.to_string(),
            strategy: strategy.to_string(),
            options,
            created_at: Utc::now(),
        };
        guard.record_decomposition(record.clone());
        Ok(record)
    }

    /// Resolves a prior decomposition by `decompose_id`, or by
    /// `use_last_decompose` semantics when no id is given.
    pub async fn lookup_decomposition(
        &self,
        session_id: Option<&str>,
        context_id: Option<&str>,
        decompose_id: Option<&str>,
    ) -> Result<DecompositionRecord> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.touch();

        if let Some(decompose_id) = decompose_id {
            let record = guard
                .decompositions
                .get(decompose_id)
                .cloned()
                .ok_or_else(|| SessionError::InvalidInput {
                    message: format!("unknown decompose_id: {decompose_id}"),
                })?;
            if let Some(caller_context) = context_id {
                if caller_context != "main" && caller_context != record.context_id {
                    return Err(SessionError::InvalidInput {
                        message: format!(
                            "decompose_id {decompose_id} was recorded for context {} but context {caller_context} was requested",
                            record.context_id
                        ),
                    });
                }
            }
            return Ok(record);
        }

        if let Some(ctx) = context_id {
            if let Some(id) = guard.last_decompose_per_context.get(ctx) {
                if let Some(record) = guard.decompositions.get(id) {
                    return Ok(record.clone());
                }
            }
        }

        guard
            .last_decompose_global
            .as_ref()
            .and_then(|id| guard.decompositions.get(id))
            .cloned()
            .ok_or_else(|| SessionError::InvalidInput {
                message: "no prior decomposition exists for this session".to_string(),
            })
    }

    pub async fn push_history(&self, session_id: Option<&str>, record: ExecutionRecord) -> Result<()> {
        let (_, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.push_history(record);
        Ok(())
    }

    pub async fn clear(&self, session_id: Option<&str>) -> Result<()> {
        let (sid, handle) = self.resolve(session_id).await?;
        let mut guard = handle.write().await;
        guard.contexts.clear();
        guard.variables.clear();
        guard.history.clear();
        guard.decompositions.clear();
        guard.last_decompose_per_context.clear();
        guard.last_decompose_global = None;
        guard.answer = AnswerState::default();
        guard.touch();
        drop(guard);
        self.invalidate_session(&sid);
        Ok(())
    }

    pub async fn destroy(&self, session_id: &str) -> Result<()> {
        if self.sessions.remove(session_id).is_none() {
            return Err(SessionError::SessionNotFound {
                id: session_id.to_string(),
            });
        }
        self.invalidate_session(session_id);
        Ok(())
    }

    #[must_use]
    pub fn metrics_snapshot(&self) -> (usize, u64, u64) {
        (
            self.sessions.len(),
            self.sessions_created.load(Ordering::Relaxed),
            self.sessions_evicted.load(Ordering::Relaxed),
        )
    }
}
