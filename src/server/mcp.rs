//! Minimal MCP (JSON-RPC 2.0) endpoint exposing the `capital` tool.
//!
//! Supported methods: `initialize`, `ping`, `tools/list`, `tools/call`.
//! Notifications (requests without an `id`) are acknowledged with 202.
//! Tool failures are reported inside the result with `isError: true`;
//! protocol failures use JSON-RPC error objects.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::routes::AppState;
use crate::gateway::{ToolDescriptor, ToolRequest, ToolResponse, TOOL_NAME};

pub const PROTOCOL_VERSION: &str = "2025-06-18";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    jsonrpc: String,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn jsonrpc_ok(id: Value, result: Value) -> Response {
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response()
}

fn jsonrpc_error(id: Value, code: i64, message: impl Into<String>) -> Response {
    let error = JsonRpcError {
        code,
        message: message.into(),
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "error": error })).into_response()
}

/// POST /mcp
pub async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return jsonrpc_error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)),
    };

    let Some(id) = request.id.clone() else {
        tracing::debug!(method = %request.method, "MCP notification");
        return StatusCode::ACCEPTED.into_response();
    };

    if request.jsonrpc != "2.0" {
        return jsonrpc_error(id, INVALID_REQUEST, "jsonrpc must be 2.0");
    }

    match request.method.as_str() {
        "initialize" => jsonrpc_ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": "capital-explorer",
                    "version": crate::VERSION,
                },
                "capabilities": { "tools": {} },
            }),
        ),
        "ping" => jsonrpc_ok(id, json!({})),
        "tools/list" => jsonrpc_ok(id, json!({ "tools": [ToolDescriptor::capital()] })),
        "tools/call" => {
            let params = match request
                .params
                .and_then(|p| serde_json::from_value::<ToolCallParams>(p).ok())
            {
                Some(params) => params,
                None => return jsonrpc_error(id, INVALID_PARAMS, "Invalid tool call parameters"),
            };
            if params.name != TOOL_NAME {
                return jsonrpc_error(id, INVALID_PARAMS, format!("Unknown tool: {}", params.name));
            }
            jsonrpc_ok(id, call_capital_tool(&state, params.arguments).await)
        }
        other => jsonrpc_error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
    }
}

async fn call_capital_tool(state: &AppState, arguments: Value) -> Value {
    let outcome = match serde_json::from_value::<ToolRequest>(arguments) {
        Ok(request) => state.gateway.invoke(request).await,
        Err(e) => Err(crate::gateway::GatewayError::invalid_input(format!(
            "Malformed arguments: {}",
            e
        ))),
    };

    match outcome {
        Ok(response) => tool_result(response),
        Err(err) => json!({
            "content": [{ "type": "text", "text": err.message }],
            "isError": true,
        }),
    }
}

/// Shape a gateway response as an MCP tool result. The roster travels in
/// `_meta` so the widget can render it without the model seeing it.
fn tool_result(response: ToolResponse) -> Value {
    let text = format!(
        "Showing {} ({}). {}",
        response.capital().name,
        response.capital().country.name,
        response.capital().model_context()
    );
    let ToolResponse {
        structured_content,
        response_metadata,
    } = response;
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured_content,
        "_meta": response_metadata,
        "isError": false,
    })
}
