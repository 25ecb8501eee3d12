//! Core remediation handler.
//!
//! One invocation runs auth, payload decoding, the instance reboot, and the
//! outcome notification. The handler itself is infallible: auth failures
//! become 401 responses and remediation failures become 500 responses with a
//! best-effort failure notification behind them.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::event::{field_text, payload_from_event, AlertFields};
use crate::providers::{ComputeProvider, NotificationPublisher, ProviderError};

/// Character limit for a published notification message.
const MAX_MESSAGE_CHARS: usize = 8000;

/// Character limit for the raw payload snippet embedded in a notification.
const MAX_PAYLOAD_SNIPPET_CHARS: usize = 1200;

/// Subject line for successful remediation notifications.
const SUBJECT_TRIGGERED: &str = "Auto-Remediation Triggered";

/// Subject line for failed remediation notifications.
const SUBJECT_FAILED: &str = "Auto-Remediation FAILED";

/// Header carrying the shared webhook secret.
const SECRET_HEADER: &str = "x-webhook-secret";

/// Per-invocation context passed alongside the event.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Request-correlation identifier, when the caller has one.
    pub request_id: Option<String>,
}

/// Status code and serialized JSON body produced by the handler.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Serialized JSON body.
    pub body: String,
}

impl HandlerResponse {
    fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            body: safe_json(body),
        }
    }
}

/// Outcome notification published after a successful reboot request.
#[derive(Debug, Serialize)]
struct RemediationResult<'a> {
    ts: String,
    result: &'static str,
    instance_id: &'a str,
    alert_name: &'a Value,
    source_host: &'a Value,
    slow_calls: &'a Value,
    timeslice: &'a Value,
    raw_payload_truncated: String,
}

/// Webhook-triggered remediation handler.
///
/// Holds the deployment configuration and the two provider clients; a single
/// instance serves every invocation. Which instance gets rebooted and which
/// topic gets notified come from configuration, never from the payload.
pub struct WebhookRemediationHandler {
    config: Config,
    compute: Arc<dyn ComputeProvider>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl WebhookRemediationHandler {
    /// Create a handler from configuration and provider clients.
    pub fn new(
        config: Config,
        compute: Arc<dyn ComputeProvider>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            config,
            compute,
            publisher,
        }
    }

    /// Process one webhook event end to end.
    pub async fn handle(&self, event: &Value, ctx: &InvocationContext) -> HandlerResponse {
        if let Some(secret) = &self.config.webhook_secret {
            if !secret_matches(event, secret) {
                warn!(
                    action = "webhook_rejected",
                    reason = "invalid_or_missing_secret",
                    "Webhook rejected"
                );
                return HandlerResponse::json(
                    401,
                    &json!({ "ok": false, "message": "Unauthorized" }),
                );
            }
        }

        let payload = payload_from_event(event);
        let fields = AlertFields::from_payload(&payload);

        info!(
            action = "auto_remediation_start",
            instance_id = %self.config.instance_id,
            alert_name = %field_text(&fields.alert_name),
            source_host = %field_text(&fields.source_host),
            slow_calls = %field_text(&fields.slow_calls),
            timeslice = %field_text(&fields.timeslice),
            request_id = ctx.request_id.as_deref(),
            "Starting auto-remediation"
        );

        match self.remediate(&payload, &fields).await {
            Ok(()) => HandlerResponse::json(
                200,
                &json!({
                    "ok": true,
                    "message": "Reboot initiated",
                    "instance_id": self.config.instance_id,
                }),
            ),
            Err(e) => {
                error!(
                    action = "auto_remediation_error",
                    instance_id = %self.config.instance_id,
                    error = %e,
                    "Auto-remediation failed"
                );
                self.publish_failure(&e).await;
                HandlerResponse::json(
                    500,
                    &json!({
                        "ok": false,
                        "message": "Remediation failed",
                        "error": e.to_string(),
                    }),
                )
            }
        }
    }

    /// Reboot the configured instance and publish the outcome.
    async fn remediate(&self, payload: &Value, fields: &AlertFields) -> Result<(), ProviderError> {
        let ts = Utc::now().to_rfc3339();

        self.compute
            .reboot_instances(std::slice::from_ref(&self.config.instance_id))
            .await?;

        let result = RemediationResult {
            ts,
            result: "reboot_initiated",
            instance_id: &self.config.instance_id,
            alert_name: &fields.alert_name,
            source_host: &fields.source_host,
            slow_calls: &fields.slow_calls,
            timeslice: &fields.timeslice,
            raw_payload_truncated: truncate_chars(&safe_json(payload), MAX_PAYLOAD_SNIPPET_CHARS),
        };

        let message = truncate_chars(&safe_json(&result), MAX_MESSAGE_CHARS);
        self.publisher
            .publish(&self.config.sns_topic_arn, SUBJECT_TRIGGERED, &message)
            .await
    }

    /// Best-effort failure notification. A publish error here is logged and
    /// swallowed so it cannot mask the original failure.
    async fn publish_failure(&self, error: &ProviderError) {
        let body = json!({
            "ok": false,
            "instance_id": self.config.instance_id,
            "error": error.to_string(),
        });
        let message = truncate_chars(&safe_json(&body), MAX_MESSAGE_CHARS);

        if let Err(e) = self
            .publisher
            .publish(&self.config.sns_topic_arn, SUBJECT_FAILED, &message)
            .await
        {
            warn!(error = %e, "Failed to publish failure notification");
        }
    }
}

/// Pull the caller-provided secret out of the event's header map.
///
/// Header names are matched case-insensitively; gateways disagree on casing.
fn provided_secret(event: &Value) -> Option<&str> {
    event
        .get("headers")?
        .as_object()?
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(SECRET_HEADER))
        .and_then(|(_, value)| value.as_str())
}

/// Constant-time comparison of the provided secret against the configured one.
fn secret_matches(event: &Value, secret: &str) -> bool {
    provided_secret(event)
        .is_some_and(|provided| provided.as_bytes().ct_eq(secret.as_bytes()).into())
}

/// Serialize a value for a notification or response body. Falls back to the
/// debug form rather than failing the remediation over a serialization issue.
fn safe_json<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

/// Truncate to at most `max` characters, always on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
