//! # Capital Explorer
//!
//! Capital-city resolution service and the tool-invocation protocol used by
//! agent map surfaces.
//!
//! - [`capitals`] - dataset, resolver, and great-circle ranking
//! - [`enrichment`] - best-effort photo and description sources
//! - [`gateway`] - the `capital` tool: validation, error mapping, roster bundling
//! - [`session`] - consumer-side invocation state machine (last selection wins)
//! - [`server`] - axum HTTP and MCP endpoints
//! - [`config`] - environment configuration

pub mod capitals;
pub mod config;
pub mod enrichment;
pub mod gateway;
pub mod server;
pub mod session;

pub use capitals::{
    CapitalError, CapitalRecord, CapitalRepository, CapitalResolver, CapitalSummary, GeoPoint,
};
pub use config::ExplorerConfig;
pub use gateway::{CapitalTool, GatewayError, HttpToolClient, ToolGateway, ToolRequest, ToolResponse};
pub use session::{InvocationPhase, InvocationState, InvocationStateMachine, Selection};

/// Crate version reported by `/health` and MCP `initialize`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
