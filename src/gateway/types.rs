//! Wire types for the `capital` tool.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capitals::{CapitalError, CapitalRecord, CapitalSummary, ErrorKind};

/// Name under which the tool is advertised.
pub const TOOL_NAME: &str = "capital";

const GENERIC_FAILURE: &str = "Capital data is temporarily unavailable";

/// Tool arguments: a country code, country name, or capital name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    #[serde(alias = "countryCode")]
    pub name: String,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredContent {
    pub capital: CapitalRecord,
}

/// Side-channel data returned with every answer so the consumer can render
/// the whole map without a second request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub all_capitals: Vec<CapitalSummary>,
}

/// Successful tool response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub structured_content: StructuredContent,
    pub response_metadata: ResponseMetadata,
}

impl ToolResponse {
    pub fn new(capital: CapitalRecord, all_capitals: Vec<CapitalSummary>) -> Self {
        Self {
            structured_content: StructuredContent { capital },
            response_metadata: ResponseMetadata { all_capitals },
        }
    }

    pub fn capital(&self) -> &CapitalRecord {
        &self.structured_content.capital
    }
}

/// Structured tool failure. Serializes as `{"error": message, "kind": kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    #[serde(rename = "error")]
    pub message: String,
}

impl GatewayError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    /// Internal fault. The message never carries the underlying detail.
    pub fn internal() -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<CapitalError> for GatewayError {
    fn from(err: CapitalError) -> Self {
        match &err {
            CapitalError::InvalidInput(_) => Self::invalid_input(err.to_string()),
            CapitalError::NotFound(_) => Self::not_found(err.to_string()),
            CapitalError::DataIntegrity { .. } => {
                log::error!("Resolution failed on dataset integrity: {}", err);
                Self {
                    kind: ErrorKind::DataIntegrity,
                    message: GENERIC_FAILURE.to_string(),
                }
            }
            CapitalError::Internal(_) => {
                log::error!("Resolution failed: {}", err);
                Self::internal()
            }
        }
    }
}

/// Tool descriptor advertised through `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn capital() -> Self {
        Self {
            name: TOOL_NAME,
            title: "Capital explorer",
            description: "Show an interactive map of world capitals centred on the capital of \
                          the given country, with population, currencies, photos and a short \
                          description.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Country code (ISO 3166-1 alpha-2 or alpha-3), country name, or capital name"
                    }
                },
                "required": ["name"],
                "additionalProperties": false
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_country_code_alias() {
        let req: ToolRequest = serde_json::from_str(r#"{"countryCode": "fr"}"#).unwrap();
        assert_eq!(req.name, "fr");
        let req: ToolRequest = serde_json::from_str(r#"{"name": "France"}"#).unwrap();
        assert_eq!(req.name, "France");
    }

    #[test]
    fn test_error_wire_shape() {
        let json = serde_json::to_value(GatewayError::not_found("No capital known for ZZ")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "not_found", "error": "No capital known for ZZ"}));
    }

    #[test]
    fn test_integrity_detail_not_leaked() {
        let err: GatewayError = CapitalError::DataIntegrity {
            code: "XK".to_string(),
            field: "population",
        }
        .into();
        assert_eq!(err.kind, ErrorKind::DataIntegrity);
        assert!(!err.message.contains("population"));
        assert!(!err.message.contains("XK"));
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err: GatewayError = CapitalError::Internal("pool exhausted at 0xdead".to_string()).into();
        assert_eq!(err, GatewayError::internal());
    }

    #[test]
    fn test_invalid_input_surfaced_verbatim() {
        let err: GatewayError = CapitalError::InvalidInput("'F' is not a two-letter country code".to_string()).into();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert!(err.message.contains("'F' is not a two-letter country code"));
    }

    #[test]
    fn test_descriptor_schema() {
        let json = serde_json::to_value(ToolDescriptor::capital()).unwrap();
        assert_eq!(json["name"], "capital");
        assert_eq!(json["inputSchema"]["required"][0], "name");
    }
}
