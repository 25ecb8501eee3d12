//! HTTP server exposing the remediation webhook.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handler::{HandlerResponse, InvocationContext, WebhookRemediationHandler};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Remediation handler.
    pub handler: Arc<WebhookRemediationHandler>,
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/alert", post(alert_webhook_handler))
        .route("/trigger/remediate", post(trigger_remediate))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// # Errors
/// Returns an error if the server fails to bind or serve.
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Remediation server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Primary webhook ingress.
///
/// Wraps the raw HTTP request into the gateway envelope shape the handler
/// understands, so header auth and body decoding behave identically for
/// gateway-fronted and direct deployments.
async fn alert_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResponse {
    let ctx = invocation_context(&headers);
    let event = envelope_from_request(&headers, &body);
    state.handler.handle(&event, &ctx).await
}

/// Manual trigger: the request body is handed to the handler verbatim, either
/// a bare alert payload or a pre-wrapped envelope.
async fn trigger_remediate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<Value>,
) -> HandlerResponse {
    let ctx = invocation_context(&headers);
    state.handler.handle(&event, &ctx).await
}

/// Correlation id from the request, generating one when the caller sent none.
fn invocation_context(headers: &HeaderMap) -> InvocationContext {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    InvocationContext {
        request_id: Some(request_id),
    }
}

/// Wrap an HTTP request into the gateway envelope shape.
///
/// Non-UTF-8 bodies are base64-encoded and flagged, the same transport
/// encoding an API gateway applies.
fn envelope_from_request(headers: &HeaderMap, body: &Bytes) -> Value {
    let mut header_map = Map::new();
    for (name, value) in headers {
        if let Ok(text) = value.to_str() {
            header_map.insert(name.as_str().to_string(), Value::String(text.to_string()));
        }
    }

    let (body_text, is_base64) = match std::str::from_utf8(body) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (
            base64::engine::general_purpose::STANDARD.encode(body),
            true,
        ),
    };

    json!({
        "headers": header_map,
        "body": body_text,
        "isBase64Encoded": is_base64,
    })
}
