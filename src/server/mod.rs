//! HTTP server for the capital explorer.
//!
//! Exposes the `capital` tool to agent runtimes (plain JSON and MCP) and
//! the read endpoints used by non-agent consumers.
//!
//! # Endpoints
//!
//! - `GET  /health`            - Liveness probe
//! - `GET  /capitals`          - Roster
//! - `GET  /capital/:code`     - Bare capital record
//! - `POST /tools/capital`     - Tool invocation
//! - `POST /mcp`               - MCP JSON-RPC

pub mod mcp;
pub mod routes;

pub use routes::{app_router, AppState};
