//! HTTP API: server, response types, and SSE log streaming.

pub mod logs;
pub mod server;
pub mod types;
