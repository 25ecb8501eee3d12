//! Provider abstractions and AWS Query API clients.
//!
//! This module defines the capability traits remediation needs and the
//! concrete EC2 and SNS clients behind them.

use reqwest::StatusCode;

pub mod ec2;
pub mod sns;
mod traits;

pub use traits::{ComputeProvider, NotificationPublisher, ProviderError};

// Re-export provider clients
pub use ec2::Ec2Client;
pub use sns::SnsClient;

/// Map a Query API response to success or a provider error.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<(), ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await?;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ProviderError::Auth(text))
    } else {
        Err(ProviderError::Api {
            status: status.as_u16(),
            message: text,
        })
    }
}
