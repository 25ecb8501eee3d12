//! Provider traits and common error type.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during provider API calls.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),
}

/// Compute-side capability needed for remediation.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Request a reboot of the given instances.
    async fn reboot_instances(&self, instance_ids: &[String]) -> Result<(), ProviderError>;
}

/// Notification-side capability needed for remediation.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publish a subject and message to the given topic.
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), ProviderError>;
}
