//! Incoming event decoding and alert field extraction.
//!
//! Events arrive in one of two shapes: an HTTP gateway envelope carrying the
//! alert JSON in a `body` string (optionally base64-encoded), or the alert
//! object itself. Both are first-class; decoding never fails.

use base64::Engine;
use serde_json::{json, Map, Value};

/// Decode the alert payload from an incoming event.
///
/// Envelope events (any object with a `body` key) get their body decoded and
/// parsed; other objects are the payload themselves; anything else decodes to
/// an empty object. Unparseable bodies are wrapped as `{"raw_body": ...}` so
/// the caller still sees what arrived.
#[must_use]
pub fn payload_from_event(event: &Value) -> Value {
    match event {
        Value::Object(map) if map.contains_key("body") => payload_from_envelope(map),
        Value::Object(_) => event.clone(),
        _ => json!({}),
    }
}

fn payload_from_envelope(event: &Map<String, Value>) -> Value {
    let body = match event.get("body") {
        Some(Value::String(s)) => s.clone(),
        // Some gateways hand over an already-parsed body object
        Some(Value::Object(map)) => return Value::Object(map.clone()),
        _ => return json!({}),
    };

    let is_base64 = event
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let decoded = if is_base64 {
        match base64::engine::general_purpose::STANDARD
            .decode(body.trim())
            .map(String::from_utf8)
        {
            Ok(Ok(text)) => text,
            _ => return json!({ "raw_body": body }),
        }
    } else {
        body
    };

    if decoded.trim().is_empty() {
        return json!({});
    }

    serde_json::from_str(&decoded).unwrap_or_else(|_| json!({ "raw_body": decoded }))
}

/// Fields extracted from an alert payload.
///
/// Monitoring systems rename these across webhook versions, so each field has
/// an alias chain and an `unknown-*` placeholder. Extracted values are kept
/// as raw JSON values; numbers stay numbers.
#[derive(Debug, Clone)]
pub struct AlertFields {
    /// Alert or monitor name.
    pub alert_name: Value,
    /// Host the alert fired on.
    pub source_host: Value,
    /// Slow call count that tripped the alert.
    pub slow_calls: Value,
    /// Timeslice the measurement covered.
    pub timeslice: Value,
}

impl AlertFields {
    /// Extract alert fields from a decoded payload. Never fails.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            alert_name: field_or(payload, &["monitorName", "alert_name"], "unknown-alert"),
            source_host: field_or(payload, &["sourceHost", "_sourceHost"], "unknown-host"),
            slow_calls: field_or(payload, &["slow_calls", "count"], "unknown-count"),
            timeslice: field_or(payload, &["timeslice", "_timeslice"], "unknown-timeslice"),
        }
    }
}

/// First key present with a non-null value wins; otherwise the placeholder.
fn field_or(payload: &Value, keys: &[&str], placeholder: &str) -> Value {
    keys.iter()
        .filter_map(|key| payload.get(key))
        .find(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(|| Value::String(placeholder.to_string()))
}

/// String form of a field for log lines: strings unquoted, everything else as
/// compact JSON.
#[must_use]
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
