//! ABOUTME: Layered configuration: built-in defaults, an optional TOML file, then RLM_-prefixed env vars
//! ABOUTME: Mirrors the config-crate layering convention used across the workspace's config layer

use std::path::Path;

use serde::{Deserialize, Serialize};

const CONFIG_SEARCH_PATHS: &[&str] = &["rlm.toml", ".rlm.toml", "config/rlm.toml"];
const ENV_PREFIX: &str = "RLM";

/// Session Registry tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
    pub scavenger_interval_secs: u64,
    pub max_session_memory_bytes: usize,
    pub max_contexts_per_session: usize,
    pub max_variables_per_session: usize,
    pub max_context_bytes: usize,
    pub max_history_depth: usize,
    pub snapshots_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            max_sessions: 1000,
            scavenger_interval_secs: 60,
            max_session_memory_bytes: 256 * 1024 * 1024,
            max_contexts_per_session: 256,
            max_variables_per_session: 512,
            max_context_bytes: 100 * 1024 * 1024,
            max_history_depth: 100,
            snapshots_enabled: false,
        }
    }
}

/// Decomposer tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    pub max_chunks: usize,
    pub chunk_cache_max_entries: usize,
    pub chunk_cache_max_bytes: usize,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            max_chunks: 10_000,
            chunk_cache_max_entries: 2048,
            chunk_cache_max_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Ranker/Index tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub k1: f64,
    pub b: f64,
    pub index_cache_max_entries: usize,
    pub query_cache_max_entries: usize,
    pub default_top_k: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            index_cache_max_entries: 512,
            query_cache_max_entries: 1024,
            default_top_k: 10,
        }
    }
}

/// Searcher tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub regex_timeout_ms: u64,
    pub max_matches: usize,
    pub context_window_chars: usize,
    pub query_cache_max_entries: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            regex_timeout_ms: 1_000,
            max_matches: 10_000,
            context_window_chars: 80,
            query_cache_max_entries: 1024,
        }
    }
}

/// Expression Engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub execution_timeout_ms: u64,
    pub output_cap_chars: usize,
    pub history_depth: usize,
    pub find_all_match_cap: usize,
    pub range_size_cap: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            execution_timeout_ms: 30_000,
            output_cap_chars: 50_000,
            history_depth: 100,
            find_all_match_cap: 1_000,
            range_size_cap: 1_000_000,
        }
    }
}

/// Persistence provider selection (external interface, EXPANSION default impl).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub base_dir: Option<String>,
    pub snapshots: bool,
    pub max_snapshots: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_dir: None,
            snapshots: false,
            max_snapshots: 5,
        }
    }
}

/// Root configuration object, assembled by layering defaults, an optional
/// TOML file and `RLM_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RlmConfig {
    pub session: SessionConfig,
    pub decompose: DecomposeConfig,
    pub rank: RankConfig,
    pub search: SearchConfig,
    pub sandbox: SandboxConfig,
    pub persistence: PersistenceConfig,
}

impl RlmConfig {
    /// Loads configuration from built-in defaults, overlaying the first
    /// discoverable config file, then `RLM_`-prefixed environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Like `load`, but takes an explicit config file path instead of
    /// searching `CONFIG_SEARCH_PATHS`.
    pub fn load_from(explicit_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = explicit_path {
            builder = builder.add_source(config::File::from(path).required(true));
        } else {
            for candidate in CONFIG_SEARCH_PATHS {
                if Path::new(candidate).exists() {
                    builder = builder.add_source(config::File::with_name(candidate).required(false));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let cfg = RlmConfig::default();
        assert_eq!(cfg.rank.k1, 1.5);
        assert_eq!(cfg.rank.b, 0.75);
        assert_eq!(cfg.search.regex_timeout_ms, 1_000);
        assert_eq!(cfg.sandbox.execution_timeout_ms, 30_000);
        assert_eq!(cfg.sandbox.output_cap_chars, 50_000);
        assert_eq!(cfg.session.session_ttl_secs, 3600);
    }
}
