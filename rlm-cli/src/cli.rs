//! ABOUTME: CLI argument parsing for the `rlm-server` binary
//! ABOUTME: Global `--config`/`--trace` flags plus the `serve` (default) and `once` subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Trace level for the stderr tracing subscriber.
///
/// Priority: `RUST_LOG` > `--trace` > the `warn` default baked into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<TraceLevel> for tracing::Level {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off => tracing::Level::ERROR,
            TraceLevel::Error => tracing::Level::ERROR,
            TraceLevel::Warn => tracing::Level::WARN,
            TraceLevel::Info => tracing::Level::INFO,
            TraceLevel::Debug => tracing::Level::DEBUG,
            TraceLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Command-line interface for the RLM server.
#[derive(Parser, Debug)]
#[command(name = "rlm-server")]
#[command(version)]
#[command(about = "Context chunking, ranking, search and sandboxed-execution server")]
pub struct Cli {
    /// Configuration file (defaults to rlm.toml / .rlm.toml / config/rlm.toml if present)
    #[arg(short = 'c', long, global = true, env = "RLM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Trace level for stderr logging
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub trace: TraceLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve tool calls over line-delimited JSON on stdio (default if no subcommand is given)
    Serve,

    /// Execute a single tool call and exit; reads stdin if REQUEST is omitted
    ///
    /// REQUEST is a JSON object: `{"tool": "rlm_load_context", "params": {...}}`.
    Once {
        /// The request JSON, or omitted to read one line from stdin
        request: Option<String>,
    },
}

impl Cli {
    #[must_use]
    pub fn command_or_default(&self) -> Commands {
        match &self.command {
            Some(cmd) => match cmd {
                Commands::Serve => Commands::Serve,
                Commands::Once { request } => Commands::Once { request: request.clone() },
            },
            None => Commands::Serve,
        }
    }
}
