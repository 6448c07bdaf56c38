// File: crates/bookline_booking/src/handlers.rs
//! Wire adapters over the booking orchestrator.
//!
//! Three envelope shapes are supported, all translating to the same
//! canonical request/result pair: a plain REST endpoint, a JSON-RPC
//! style `tools/call` endpoint, and an SSE discovery stream that
//! advertises the RPC endpoint to probing voice-agent platforms.

use crate::logic::{BookingConfirmation, BookingOrchestrator, BookingRejection};
use crate::validation::RawBookingRequest;
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use bookline_common::{BookingError, HttpStatusCode};
use bookline_config::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// The single tool exposed over the RPC envelope.
pub const TOOL_NAME: &str = "book_appointment";

/// Path the SSE discovery stream advertises.
const RPC_ENDPOINT: &str = "/api/mcp";

// Define shared state needed by booking handlers
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<BookingOrchestrator>,
}

/// Liveness probe, also answered when booking is not configured.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "bookline" }))
}

/// REST adapter: direct JSON body in, confirmation or rejection out.
///
/// Rejections carry the taxonomy's status mapping; a taken slot is
/// signalled as 409 Conflict.
#[axum::debug_handler]
pub async fn book_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<RawBookingRequest>,
) -> Result<Json<BookingConfirmation>, (StatusCode, Json<BookingRejection>)> {
    if !state.config.use_gcal {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(BookingRejection::new("Calendar booking is disabled.")),
        ));
    }

    match state.orchestrator.book(request).await {
        Ok(confirmation) => Ok(Json(confirmation)),
        Err(err) => Err((rejection_status(&err), Json(BookingRejection::from(&err)))),
    }
}

fn rejection_status(err: &BookingError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// --- RPC envelope ---

#[derive(Deserialize, Debug)]
pub struct RpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Serialize, Debug)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Maps the booking taxonomy onto RPC error codes: invalid requests to
/// -32602, the canonical slot-taken conflict to -32009, upstream
/// failures to -32000.
pub(crate) fn rpc_error_code(err: &BookingError) -> i64 {
    match err.status_code() {
        400 => -32602,
        409 => -32009,
        _ => -32000,
    }
}

/// Unwraps `params.arguments` of a `tools/call` envelope into the
/// canonical request.
pub(crate) fn parse_tool_call(params: &Value) -> Result<RawBookingRequest, RpcError> {
    let tool = params
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if tool != TOOL_NAME {
        return Err(RpcError {
            code: -32602,
            message: format!("Unknown tool: {tool}"),
        });
    }
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));
    serde_json::from_value(arguments).map_err(|e| RpcError {
        code: -32602,
        message: format!("Invalid tool arguments: {e}"),
    })
}

fn tool_descriptor() -> Value {
    json!({
        "tools": [{
            "name": TOOL_NAME,
            "description": "Book a 30-minute video consultation slot",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name":  { "type": "string", "description": "Client name" },
                    "phone": { "type": "string", "description": "Client phone number" },
                    "email": { "type": "string", "description": "Client email address" },
                    "start": { "type": "string", "description": "Requested start, ISO 8601 or YYYY-MM-DD HH:MM" }
                },
                "required": ["phone", "start"]
            }
        }]
    })
}

/// RPC adapter: `tools/list` advertises the booking tool, `tools/call`
/// runs the orchestrator and wraps the outcome in a `result`/`error`
/// envelope.
#[axum::debug_handler]
pub async fn rpc_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    info!(method = %request.method, "RPC request received");
    match request.method.as_str() {
        "tools/list" => Json(RpcResponse::result(request.id, tool_descriptor())),
        "tools/call" => {
            if !state.config.use_gcal {
                return Json(RpcResponse::error(
                    request.id,
                    -32000,
                    "Calendar booking is disabled.",
                ));
            }
            let raw = match parse_tool_call(&request.params) {
                Ok(raw) => raw,
                Err(rpc_err) => {
                    return Json(RpcResponse {
                        jsonrpc: "2.0",
                        id: request.id,
                        result: None,
                        error: Some(rpc_err),
                    })
                }
            };
            match state.orchestrator.book(raw).await {
                Ok(confirmation) => Json(RpcResponse::result(
                    request.id,
                    serde_json::to_value(confirmation).unwrap_or(Value::Null),
                )),
                Err(err) => Json(RpcResponse::error(
                    request.id,
                    rpc_error_code(&err),
                    err.to_string(),
                )),
            }
        }
        other => Json(RpcResponse::error(
            request.id,
            -32601,
            format!("Method not found: {other}"),
        )),
    }
}

// --- SSE discovery ---

/// Discovery stream for platforms that probe with an event-stream GET:
/// a single `endpoint` event pointing at the RPC endpoint, then
/// keep-alives.
pub async fn sse_discovery_handler() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let announce = Event::default().event("endpoint").data(RPC_ENDPOINT);
    Sse::new(tokio_stream::once(Ok(announce))).keep_alive(KeepAlive::default())
}
