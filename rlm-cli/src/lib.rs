//! ABOUTME: Library half of the `rlm-server` binary: CLI parsing and the stdio transport
//! ABOUTME: Kept separate from `main.rs` so the transport and arg-parsing are independently testable

pub mod cli;
pub mod transport;
