//! STS identity endpoint.

use crate::AwsClient;
use opsaudit_core::{OpsError, Result};
use serde::{Deserialize, Serialize};

/// Who the configured credentials belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    /// Unique ID of the calling entity
    #[serde(default)]
    pub user_id: String,
    /// Account number
    pub account: String,
    /// ARN of the calling entity
    pub arn: String,
}

/// STS API endpoints
pub struct StsApi<'a> {
    client: &'a AwsClient,
}

impl<'a> StsApi<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// Resolve the caller identity.
    ///
    /// Any failure is reported as [`OpsError::Credentials`], since this is the
    /// call used to validate credentials up front.
    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        self.client
            .call("sts", "get-caller-identity", &[])
            .await
            .map_err(|e| match e {
                OpsError::CommandFailed { stderr, .. } => OpsError::Credentials(stderr),
                OpsError::ToolMissing(tool) => OpsError::ToolMissing(tool),
                other => OpsError::Credentials(other.to_string()),
            })
    }
}
