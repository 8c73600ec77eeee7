//! HTTP API module.
//!
//! This module provides the HTTP server, the API types and the log sink.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::start_server;
pub use types::*;
