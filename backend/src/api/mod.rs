//! HTTP API module.
//!
//! This module provides the HTTP server, its response types and the log
//! stream shared with the CLI.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
