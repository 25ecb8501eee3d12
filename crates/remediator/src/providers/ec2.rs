//! EC2 Query API client.
//!
//! Covers the single EC2 action remediation needs: `RebootInstances`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::check_response;
use super::traits::{ComputeProvider, ProviderError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// EC2 Query API version.
const API_VERSION: &str = "2016-11-15";

/// EC2 API client.
#[derive(Clone)]
pub struct Ec2Client {
    /// HTTP client.
    client: Client,
    /// AWS region.
    region: String,
    /// Endpoint override for tests and localstack.
    endpoint: Option<String>,
}

impl Ec2Client {
    /// Create a new EC2 client for the given region.
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

    /// Get the EC2 API endpoint.
    fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://ec2.{}.amazonaws.com", self.region))
    }

    /// Execute a form-encoded Query API request.
    /// Note: In production, use aws-sigv4 crate for proper request signing.
    async fn query_request(&self, params: &[(String, String)]) -> Result<(), ProviderError> {
        let url = self.endpoint_url();
        debug!(url = %url, "EC2 request");

        let response = self
            .client
            .post(&url)
            .header(
                "X-Amz-Date",
                chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string(),
            )
            .form(&params)
            .send()
            .await?;

        check_response(response).await
    }
}

#[async_trait]
impl ComputeProvider for Ec2Client {
    async fn reboot_instances(&self, instance_ids: &[String]) -> Result<(), ProviderError> {
        info!(instance_ids = ?instance_ids, "Rebooting instances");

        let mut params: Vec<(String, String)> = vec![
            ("Action".to_string(), "RebootInstances".to_string()),
            ("Version".to_string(), API_VERSION.to_string()),
        ];
        for (i, id) in instance_ids.iter().enumerate() {
            params.push((format!("InstanceId.{}", i + 1), id.clone()));
        }

        self.query_request(&params).await?;

        info!(instance_ids = ?instance_ids, "Instance reboot initiated");
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
        let client = Ec2Client::new("eu-central-1").unwrap();
        assert_eq!(
            client.endpoint_url(),
            "https://ec2.eu-central-1.amazonaws.com"
        );
    }

    #[tokio::test]
    async fn test_reboot_sends_query_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=RebootInstances"))
            .and(body_string_contains("Version=2016-11-15"))
            .and(body_string_contains("InstanceId.1=i-0123456789abcdef0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = Ec2Client::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        client
            .reboot_instances(&["i-0123456789abcdef0".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reboot_numbers_multiple_instances() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("InstanceId.1=i-aaa"))
            .and(body_string_contains("InstanceId.2=i-bbb"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = Ec2Client::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        client
            .reboot_instances(&["i-aaa".to_string(), "i-bbb".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("InvalidInstanceID.Malformed"),
            )
            .mount(&server)
            .await;

        let client = Ec2Client::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        let err = client
            .reboot_instances(&["bogus".to_string()])
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("InvalidInstanceID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("AuthFailure"))
            .mount(&server)
            .await;

        let client = Ec2Client::new("us-east-1")
            .unwrap()
            .with_endpoint(server.uri());
        let err = client
            .reboot_instances(&["i-aaa".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Auth(_)));
    }
}
