//! SNS Query API client.
//!
//! Covers the single SNS action remediation needs: `Publish`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::check_response;
use super::traits::{NotificationPublisher, ProviderError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// SNS Query API version.
const API_VERSION: &str = "2010-03-31";

/// SNS API client.
#[derive(Clone)]
pub struct SnsClient {
    /// HTTP client.
    client: Client,
    /// AWS region.
    region: String,
    /// Endpoint override for tests and localstack.
    endpoint: Option<String>,
}

impl SnsClient {
    /// Create a new SNS client for the given region.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(region: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            client,
            region: region.into(),
            endpoint: None,
        })
    }

    /// Override the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Get the SNS API endpoint.
    fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://sns.{}.amazonaws.com", self.region))
    }
}

#[async_trait]
impl NotificationPublisher for SnsClient {
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), ProviderError> {
        debug!(topic_arn = %topic_arn, subject = %subject, "Publishing notification");

        let params = [
            ("Action", "Publish"),
            ("Version", API_VERSION),
            ("TopicArn", topic_arn),
            ("Subject", subject),
            ("Message", message),
        ];

        // Note: In production, use aws-sigv4 crate for proper request signing.
        let response = self
            .client
            .post(self.endpoint_url())
            .header(
                "X-Amz-Date",
                chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string(),
            )
            .form(&params)
            .send()
            .await?;

        check_response(response).await?;

        info!(topic_arn = %topic_arn, subject = %subject, "Notification published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_endpoint_uses_region() {
        let client = SnsClient::new("us-west-2").unwrap();
        assert_eq!(client.endpoint_url(), "https://sns.us-west-2.amazonaws.com");
    }

    #[tokio::test]
    async fn test_publish_sends_form_encoded_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=Publish"))
            .and(body_string_contains("Version=2010-03-31"))
            .and(body_string_contains("Subject=Auto-Remediation+Triggered"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = SnsClient::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        client
            .publish(
                "arn:aws:sns:us-east-1:111122223333:ops-alerts",
                "Auto-Remediation Triggered",
                "{\"result\":\"reboot_initiated\"}",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("SignatureDoesNotMatch"))
            .mount(&server)
            .await;

        let client = SnsClient::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        let err = client
            .publish("arn:aws:sns:us-east-1:111122223333:t", "s", "m")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Auth(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("InternalError"))
            .mount(&server)
            .await;

        let client = SnsClient::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        let err = client
            .publish("arn:aws:sns:us-east-1:111122223333:t", "s", "m")
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, .. } => assert_eq!(status, 500),
            other => panic!("unexpected error: {other}"),
        }
    }
}
