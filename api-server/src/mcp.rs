//! Stateless MCP endpoint (JSON-RPC 2.0 over HTTP POST, JSON responses).
//!
//! Exposes one tool, `launch_ai_pong_arena`, and the HTML widget resource the
//! host renders for it. The tool only acknowledges the launch; AI moves are
//! served by `/ai-move`.

use actix_web::{web, HttpResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::frontend::{load_widget_html, APP_TITLE};
use crate::AppState;

pub const RESOURCE_URI: &str = "ui://widget/ai-pong-arena-v1.html";
pub const MCP_MIME: &str = "text/html;profile=mcp-app";
pub const TOOL_NAME: &str = "launch_ai_pong_arena";

const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

const INSTRUCTIONS: &str = "Launch AI Pong Arena, a calm Pong game where the user plays against \
adaptive AI. Use the game UI widget and keep narration concise.";

const MIN_MAX_SCORE: i64 = 1;
const MAX_MAX_SCORE: i64 = 21;

// JSON-RPC error codes
const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Option<Value>,
    /// `None` only when the member is absent, which marks a notification
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl RpcResponse {
    fn reply(id: Value, outcome: Result<Value, RpcError>) -> Self {
        match outcome {
            Ok(result) => Self {
                jsonrpc: "2.0",
                id,
                result: Some(result),
                error: None,
            },
            Err(error) => Self {
                jsonrpc: "2.0",
                id,
                result: None,
                error: Some(error),
            },
        }
    }
}

/// Launch options accepted by the tool; missing fields take the game defaults
#[derive(Debug, Deserialize)]
#[serde(default)]
struct LaunchArgs {
    #[serde(deserialize_with = "whole_number")]
    max_score: i64,
    table_theme: String,
    ball_style: String,
}

impl Default for LaunchArgs {
    fn default() -> Self {
        Self {
            max_score: 7,
            table_theme: "Soft Forest".to_string(),
            ball_style: "Circle".to_string(),
        }
    }
}

/// Integer, or float without a fractional part; out-of-range values saturate.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = number.as_i64() {
        return Ok(i);
    }
    if number.as_u64().is_some() {
        return Ok(i64::MAX);
    }
    match number.as_f64() {
        // `as` saturates at the i64 bounds
        Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(D::Error::custom("max_score must be an integer")),
    }
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceRead {
    uri: String,
}

/// POST /mcp
pub async fn endpoint(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("MCP request is not JSON: {}", e);
            return HttpResponse::Ok().json(RpcResponse::reply(
                Value::Null,
                Err(RpcError::new(PARSE_ERROR, "Parse error")),
            ));
        }
    };

    let id_hint = value.get("id").cloned().unwrap_or(Value::Null);
    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return HttpResponse::Ok().json(RpcResponse::reply(
                id_hint,
                Err(RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e))),
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        return HttpResponse::Ok().json(RpcResponse::reply(
            request.id.unwrap_or(Value::Null),
            Err(RpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\"")),
        ));
    }

    let Some(id) = request.id else {
        // Notifications get no JSON-RPC reply
        tracing::debug!("MCP notification: {}", request.method);
        return HttpResponse::Accepted().finish();
    };

    tracing::info!("MCP request: {}", request.method);
    let outcome = dispatch(&state, &request.method, request.params).await;
    if let Err(e) = &outcome {
        tracing::warn!("MCP {} failed ({}): {}", request.method, e.code, e.message);
    }
    HttpResponse::Ok().json(RpcResponse::reply(id, outcome))
}

async fn dispatch(
    state: &AppState,
    method: &str,
    params: Option<Value>,
) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(initialize(params.as_ref())),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": [tool_descriptor()] })),
        "tools/call" => {
            let call: ToolCall = parse_params(params)?;
            call_tool(call)
        }
        "resources/list" => Ok(json!({ "resources": [resource_descriptor()] })),
        "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
        "resources/read" => {
            let read: ResourceRead = parse_params(params)?;
            read_resource(state, &read.uri).await
        }
        _ => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )),
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, RpcError> {
    serde_json::from_value(params.unwrap_or_else(|| json!({})))
        .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))
}

fn initialize(params: Option<&Value>) -> Value {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let version = requested
        .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false }
        },
        "serverInfo": {
            "name": APP_TITLE,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": INSTRUCTIONS
    })
}

fn widget_meta() -> Value {
    json!({
        "ui": {
            "resourceUri": RESOURCE_URI,
            "visibility": ["model", "app"]
        },
        "openai/outputTemplate": RESOURCE_URI
    })
}

fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "title": "Launch AI Pong Arena",
        "description": "Opens the AI Pong Arena game widget in ChatGPT.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "max_score": { "type": "integer", "default": 7 },
                "table_theme": { "type": "string", "default": "Soft Forest" },
                "ball_style": { "type": "string", "default": "Circle" }
            }
        },
        "_meta": widget_meta()
    })
}

fn resource_descriptor() -> Value {
    json!({
        "uri": RESOURCE_URI,
        "name": "pong_widget",
        "title": APP_TITLE,
        "mimeType": MCP_MIME
    })
}

fn call_tool(call: ToolCall) -> Result<Value, RpcError> {
    if call.name != TOOL_NAME {
        return Ok(json!({
            "isError": true,
            "content": [{ "type": "text", "text": format!("Unknown tool: {}", call.name) }]
        }));
    }

    let args: LaunchArgs = parse_params(call.arguments)?;
    Ok(launch(args))
}

fn launch(args: LaunchArgs) -> Value {
    let max_score = args.max_score.clamp(MIN_MAX_SCORE, MAX_MAX_SCORE);
    tracing::info!(
        "Launching {} (max_score={}, theme='{}', ball='{}')",
        APP_TITLE,
        max_score,
        args.table_theme,
        args.ball_style
    );

    json!({
        "content": [{ "type": "text", "text": "Launching AI Pong Arena." }],
        "structuredContent": {
            "app": APP_TITLE,
            "defaults": {
                "maxScore": max_score,
                "tableTheme": args.table_theme,
                "ballStyle": args.ball_style
            }
        },
        "isError": false,
        "_meta": widget_meta()
    })
}

async fn read_resource(state: &AppState, uri: &str) -> Result<Value, RpcError> {
    if uri != RESOURCE_URI {
        return Err(RpcError::new(
            INVALID_PARAMS,
            format!("Unknown resource: {}", uri),
        ));
    }

    let dist = state.frontend_dist.clone();
    let html = web::block(move || load_widget_html(&dist))
        .await
        .map_err(|e| RpcError::new(INTERNAL_ERROR, format!("Failed to load widget: {}", e)))?;

    Ok(json!({
        "contents": [{
            "uri": RESOURCE_URI,
            "mimeType": MCP_MIME,
            "text": html
        }]
    }))
}
