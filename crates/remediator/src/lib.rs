//! Webhook-triggered auto-remediation service.
//!
//! This crate provides:
//! - A remediation handler that validates a shared webhook secret, reboots a
//!   configured instance, and publishes the outcome to a notification topic
//! - Event decoding for gateway-wrapped and raw webhook payloads
//! - EC2 and SNS Query API clients behind capability traits
//! - An HTTP server exposing the webhook endpoint (standalone service)

pub mod config;
pub mod event;
pub mod handler;
pub mod providers;
pub mod server;

pub use config::Config;
pub use event::{payload_from_event, AlertFields};
pub use handler::{HandlerResponse, InvocationContext, WebhookRemediationHandler};
pub use providers::{ComputeProvider, Ec2Client, NotificationPublisher, ProviderError, SnsClient};
