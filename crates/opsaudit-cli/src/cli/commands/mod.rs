//! Command implementations.

pub mod audit;
pub mod config;
pub mod cost;
pub mod scan;

use opsaudit_client::api::CallerIdentity;
use opsaudit_client::{AwsClient, AwsSettings};
use std::time::Duration;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Region and profile after flag/env/config resolution
    pub settings: AwsSettings,

    /// Output format
    pub output_format: OutputFormat,

    /// Loaded configuration
    pub config: Config,
}

impl Context {
    /// AWS client for the resolved region and profile.
    pub fn aws_client(&self) -> AwsClient {
        AwsClient::new(self.settings.clone())
    }

    /// Timeout for each network lookup
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.config.lookup_timeout_secs)
    }

    /// Whether tables and lines are meant for a human
    pub fn is_pretty(&self) -> bool {
        self.output_format == OutputFormat::Pretty
    }
}

/// Fail fast unless the CLI is installed and the credentials work.
pub async fn aws_preconditions(client: &AwsClient) -> anyhow::Result<CallerIdentity> {
    client.ensure_installed()?;
    let identity = client.sts().caller_identity().await?;
    tracing::debug!(
        account = %identity.account,
        arn = %identity.arn,
        profile = client.profile(),
        region = client.region(),
        "caller identity"
    );
    Ok(identity)
}
