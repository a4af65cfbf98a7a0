//! Minimal MCP stdio server exposing the design workflows as tools.
//!
//! Every `tools/call` is answered from its own arguments; the server keeps no
//! state between calls beyond the configured engine and default overrides.

pub mod server;
pub mod transport;

pub use server::{McpServer, run_stdio_server};
