//! ABOUTME: Entry point for rlm-server: loads config, builds the Dispatcher, then serves or runs once
//! ABOUTME: Tracing goes to stderr so stdout stays clean for the stdio transport's JSON lines

use std::io::Read;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rlm_core::config::RlmConfig;
use rlm_rpc::{Dispatcher, Transport};

use rlm_cli::cli::{Cli, Commands, TraceLevel};
use rlm_cli::transport::{run_once, StdioTransport};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.trace);

    let config = RlmConfig::load_from(cli.config.as_deref())?;
    let dispatcher = Arc::new(Dispatcher::new(config));

    match cli.command_or_default() {
        Commands::Serve => {
            tracing::info!("rlm-server listening on stdio");
            StdioTransport.serve(dispatcher).await
        }
        Commands::Once { request } => {
            let request_json = match request {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let response = run_once(dispatcher, &request_json).await?;
            println!("{response}");
            Ok(())
        }
    }
}

/// Sets up the stderr tracing subscriber. Priority: `RUST_LOG` env var, then `--trace`.
fn setup_tracing(trace_level: TraceLevel) {
    use std::io;
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    } else {
        let level: tracing::Level = trace_level.into();
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}
