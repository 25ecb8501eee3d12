//! Configuration for the remediation service.

use std::env;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Remediation handler configuration.
///
/// The instance to reboot and the topic to notify are fixed per deployment;
/// they are never derived from the incoming alert payload.
#[derive(Clone, Debug)]
pub struct Config {
    /// Instance to reboot when an alert fires.
    pub instance_id: String,
    /// SNS topic that receives outcome notifications.
    pub sns_topic_arn: String,
    /// Shared webhook secret. Auth is skipped entirely when unset.
    pub webhook_secret: Option<String>,
    /// AWS region for the EC2 and SNS endpoints.
    pub region: String,
    /// HTTP server port.
    pub port: u16,
    /// EC2 endpoint override (localstack, tests).
    pub ec2_endpoint: Option<String>,
    /// SNS endpoint override.
    pub sns_endpoint: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if `INSTANCE_ID` or `SNS_TOPIC_ARN` is not set. The
    /// service refuses to start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            instance_id: env::var("INSTANCE_ID")
                .map_err(|_| ConfigError::MissingVar("INSTANCE_ID"))?,
            sns_topic_arn: env::var("SNS_TOPIC_ARN")
                .map_err(|_| ConfigError::MissingVar("SNS_TOPIC_ARN"))?,
            webhook_secret: env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            ec2_endpoint: env::var("AWS_ENDPOINT_URL_EC2").ok().filter(|s| !s.is_empty()),
            sns_endpoint: env::var("AWS_ENDPOINT_URL_SNS").ok().filter(|s| !s.is_empty()),
        })
    }
}
