//! Remediation service binary.
//!
//! Standalone HTTP service for webhook-triggered auto-remediation.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use remediator::{
    config::Config,
    providers::{Ec2Client, SnsClient},
    server::{self, AppState},
    WebhookRemediationHandler,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("remediator=info".parse()?))
        .init();

    info!("Starting remediation service...");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        instance_id = %config.instance_id,
        region = %config.region,
        auth_enabled = config.webhook_secret.is_some(),
        "Configuration loaded"
    );

    // Initialize provider clients
    let mut ec2 = Ec2Client::new(&config.region).context("Failed to create EC2 client")?;
    if let Some(endpoint) = &config.ec2_endpoint {
        ec2 = ec2.with_endpoint(endpoint);
    }

    let mut sns = SnsClient::new(&config.region).context("Failed to create SNS client")?;
    if let Some(endpoint) = &config.sns_endpoint {
        sns = sns.with_endpoint(endpoint);
    }

    // Build application state
    let handler = WebhookRemediationHandler::new(config.clone(), Arc::new(ec2), Arc::new(sns));
    let state = AppState {
        handler: Arc::new(handler),
    };

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    server::run_server(state, addr).await
}
