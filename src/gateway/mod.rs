//! Tool invocation gateway.
//!
//! The gateway is the only place that:
//! 1. Parses and validates tool payloads
//! 2. Normalizes free-form identifiers to country codes
//! 3. Maps resolver errors onto the wire error shape
//! 4. Bundles the roster into every successful response
//!
//! Consumers reach a gateway through the [`CapitalTool`] trait, either in
//! process ([`ToolGateway`]) or over HTTP ([`HttpToolClient`]).

pub mod client;
pub mod normalizer;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::capitals::{CapitalRecord, CapitalSource, CapitalSummary};

pub use client::HttpToolClient;
pub use normalizer::IdentifierNormalizer;
pub use types::{
    GatewayError, ResponseMetadata, StructuredContent, ToolDescriptor, ToolRequest, ToolResponse,
    TOOL_NAME,
};

/// A request/response transport for the `capital` tool.
#[async_trait]
pub trait CapitalTool: Send + Sync {
    async fn call(&self, request: ToolRequest) -> Result<ToolResponse, GatewayError>;
}

/// In-process gateway in front of a [`CapitalSource`].
pub struct ToolGateway {
    source: Arc<dyn CapitalSource>,
    normalizer: IdentifierNormalizer,
}

impl ToolGateway {
    /// Gateway whose identifier table is built from the source's roster.
    pub fn new(source: Arc<dyn CapitalSource>) -> Self {
        let normalizer = IdentifierNormalizer::from_roster(source.list_all());
        Self { source, normalizer }
    }

    pub fn with_normalizer(mut self, normalizer: IdentifierNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Parse a raw JSON payload into a request.
    pub fn parse_request(payload: &[u8]) -> Result<ToolRequest, GatewayError> {
        serde_json::from_slice(payload)
            .map_err(|e| GatewayError::invalid_input(format!("Malformed request: {}", e)))
    }

    /// Parse, validate, and invoke.
    pub async fn invoke_json(&self, payload: &[u8]) -> Result<ToolResponse, GatewayError> {
        let request = Self::parse_request(payload)?;
        self.invoke(request).await
    }

    /// Resolve the identifier in `request` and bundle the roster with the answer.
    pub async fn invoke(&self, request: ToolRequest) -> Result<ToolResponse, GatewayError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(GatewayError::invalid_input("'name' must not be empty"));
        }

        let code = self
            .normalizer
            .resolve(name)
            .ok_or_else(|| GatewayError::not_found(format!("No capital known for {}", name)))?;

        let capital = self.resolve_code(&code).await?;
        Ok(ToolResponse::new(capital, self.roster().to_vec()))
    }

    /// Resolve a country code directly, without identifier normalization.
    ///
    /// Resolution runs on its own task so a panicking collaborator surfaces
    /// as an internal error instead of tearing down the caller.
    pub async fn resolve_code(&self, code: &str) -> Result<CapitalRecord, GatewayError> {
        let source = Arc::clone(&self.source);
        let code = code.to_string();
        match tokio::spawn(async move { source.resolve(&code).await }).await {
            Ok(result) => result.map_err(GatewayError::from),
            Err(join_error) => {
                log::error!("Capital resolution task failed: {}", join_error);
                Err(GatewayError::internal())
            }
        }
    }

    pub fn roster(&self) -> &[CapitalSummary] {
        self.source.list_all()
    }
}

#[async_trait]
impl CapitalTool for ToolGateway {
    async fn call(&self, request: ToolRequest) -> Result<ToolResponse, GatewayError> {
        self.invoke(request).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
