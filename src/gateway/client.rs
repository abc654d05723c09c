//! HTTP transport for the `capital` tool.
//!
//! Posts `ToolRequest` bodies to `{base_url}/tools/capital` on a server
//! built from [`crate::server::app_router`].

use std::time::Duration;

use async_trait::async_trait;

use super::types::{GatewayError, ToolRequest, ToolResponse};
use super::CapitalTool;

/// Remote [`CapitalTool`] reached over HTTP.
pub struct HttpToolClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpToolClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: format!("{}/tools/capital", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Fallback when an error response has no structured body.
fn error_for_status(status: reqwest::StatusCode) -> GatewayError {
    match status.as_u16() {
        400 | 422 => GatewayError::invalid_input(format!("Request rejected ({})", status)),
        404 => GatewayError::not_found(format!("Capital not found ({})", status)),
        _ => GatewayError::internal(),
    }
}

#[async_trait]
impl CapitalTool for HttpToolClient {
    async fn call(&self, request: ToolRequest) -> Result<ToolResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::warn!("Capital tool request to {} failed: {}", self.endpoint, e);
                GatewayError::internal()
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<ToolResponse>().await.map_err(|e| {
                log::warn!("Malformed capital tool response: {}", e);
                GatewayError::internal()
            });
        }

        match response.json::<GatewayError>().await {
            Ok(err) => Err(err),
            Err(_) => Err(error_for_status(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capitals::ErrorKind;
    use crate::config::ExplorerConfig;
    use crate::server::{app_router, AppState};
    use crate::session::{InvocationPhase, InvocationStateMachine, Selection};
    use std::sync::Arc;

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn spawn_server(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn explorer_client() -> HttpToolClient {
        let config = ExplorerConfig {
            enrichment_enabled: false,
            ..ExplorerConfig::default()
        };
        let base = spawn_server(app_router(AppState::from_config(&config).unwrap())).await;
        HttpToolClient::new(&base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_call_decodes_success() {
        let client = explorer_client().await;
        let response = client.call(ToolRequest::new("France")).await.unwrap();
        assert_eq!(response.capital().name, "Paris");
        assert!(!response.response_metadata.all_capitals.is_empty());
    }

    #[tokio::test]
    async fn test_call_passes_structured_errors_through() {
        let client = explorer_client().await;

        let err = client.call(ToolRequest::new("zz")).await.unwrap_err();
        assert_eq!(err, GatewayError::not_found("No capital known for ZZ"));

        let err = client.call(ToolRequest::new("")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_unstructured_error_body_falls_back_to_status() {
        let app = axum::Router::new().route(
            "/tools/capital",
            axum::routing::post(|| async { (axum::http::StatusCode::NOT_FOUND, "nope") }),
        );
        let base = spawn_server(app).await;
        let client = HttpToolClient::new(&base, Duration::from_secs(5)).unwrap();

        let err = client.call(ToolRequest::new("FR")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_state_machine_settles_over_http() {
        let machine = InvocationStateMachine::new(Arc::new(explorer_client().await));

        let Selection::Dispatched(handle) = machine.select("Japan") else {
            panic!("expected a dispatched request");
        };
        assert!(handle.await.unwrap());

        match machine.snapshot().phase {
            InvocationPhase::Settled { target, record } => {
                assert_eq!(target, "Japan");
                assert_eq!(record.name, "Tokyo");
            }
            other => panic!("unexpected phase {:?}", other),
        }
        assert!(!machine.snapshot().roster.is_empty());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpToolClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/tools/capital");
    }

    #[test]
    fn test_error_for_status() {
        assert_eq!(
            error_for_status(reqwest::StatusCode::BAD_REQUEST).kind,
            ErrorKind::InvalidInput
        );
        assert_eq!(
            error_for_status(reqwest::StatusCode::NOT_FOUND).kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            error_for_status(reqwest::StatusCode::BAD_GATEWAY),
            GatewayError::internal()
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_internal() {
        let client = HttpToolClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.call(ToolRequest::new("FR")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
