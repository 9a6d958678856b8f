//! AWS CLI client.

use crate::api::*;
use crate::config::{AwsSettings, AWS_BINARY};
use crate::runner::{CommandRunner, SystemRunner};
use opsaudit_core::{OpsError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Drives the `aws` command-line client
#[derive(Clone)]
pub struct AwsClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    settings: AwsSettings,
}

impl std::fmt::Debug for AwsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsClient")
            .field("binary", &self.inner.binary)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl AwsClient {
    /// Create a client with the given settings, running real processes
    #[must_use]
    pub fn new(settings: AwsSettings) -> Self {
        AwsClientBuilder::new(settings).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(settings: AwsSettings) -> AwsClientBuilder {
        AwsClientBuilder::new(settings)
    }

    /// Region calls are made in
    #[must_use]
    pub fn region(&self) -> &str {
        &self.inner.settings.region
    }

    /// Profile calls are made as
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.inner.settings.profile
    }

    /// Identity endpoints
    #[must_use]
    pub fn sts(&self) -> StsApi<'_> {
        StsApi::new(self)
    }

    /// EC2 endpoints (instances, addresses, volumes, NAT gateways)
    #[must_use]
    pub fn ec2(&self) -> Ec2Api<'_> {
        Ec2Api::new(self)
    }

    /// Lambda endpoints
    #[must_use]
    pub fn lambda(&self) -> LambdaApi<'_> {
        LambdaApi::new(self)
    }

    /// S3 endpoints
    #[must_use]
    pub fn s3(&self) -> S3Api<'_> {
        S3Api::new(self)
    }

    /// Elastic Load Balancing endpoints (v2 and classic)
    #[must_use]
    pub fn elb(&self) -> ElbApi<'_> {
        ElbApi::new(self)
    }

    /// RDS endpoints
    #[must_use]
    pub fn rds(&self) -> RdsApi<'_> {
        RdsApi::new(self)
    }

    /// Cost Explorer endpoints
    #[must_use]
    pub fn cost(&self) -> CostApi<'_> {
        CostApi::new(self)
    }

    /// Fail with [`OpsError::ToolMissing`] unless the CLI is on `PATH`
    pub fn ensure_installed(&self) -> Result<()> {
        if self.inner.runner.is_installed(&self.inner.binary) {
            Ok(())
        } else {
            Err(OpsError::ToolMissing(self.inner.binary.clone()))
        }
    }

    /// Run `aws <service> <operation> [args]` and deserialise its JSON output
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        service: &str,
        operation: &str,
        args: &[&str],
    ) -> Result<T> {
        let global = self.inner.settings.global_args();
        let mut full: Vec<&str> = Vec::with_capacity(2 + args.len() + global.len());
        full.push(service);
        full.push(operation);
        full.extend_from_slice(args);
        full.extend(global.iter().map(String::as_str));

        debug!(service, operation, region = %self.inner.settings.region, "aws call");

        let output = self.inner.runner.run(&self.inner.binary, &full).await?;
        if !output.success() {
            warn!(service, operation, code = ?output.code, "aws call failed");
        }
        let stdout = output.into_stdout(&self.inner.binary)?;
        serde_json::from_str(&stdout).map_err(OpsError::Json)
    }
}

/// Builder for configuring an [`AwsClient`]
pub struct AwsClientBuilder {
    settings: AwsSettings,
    binary: String,
    runner: Option<Arc<dyn CommandRunner>>,
}

impl AwsClientBuilder {
    /// Create a new builder with the given settings
    #[must_use]
    pub fn new(settings: AwsSettings) -> Self {
        Self {
            settings,
            binary: AWS_BINARY.to_string(),
            runner: None,
        }
    }

    /// Use a custom command runner (useful for testing)
    #[must_use]
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> AwsClient {
        AwsClient {
            inner: Arc::new(ClientInner {
                runner: self
                    .runner
                    .unwrap_or_else(|| Arc::new(SystemRunner::new())),
                binary: self.binary,
                settings: self.settings,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    #[test]
    fn ensure_installed_checks_path() {
        let missing = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(ScriptedRunner::new()))
            .build();
        assert!(matches!(
            missing.ensure_installed(),
            Err(OpsError::ToolMissing(ref p)) if p == "aws"
        ));

        let present = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(ScriptedRunner::new().installed("aws")))
            .build();
        assert!(present.ensure_installed().is_ok());
    }

    #[tokio::test]
    async fn call_appends_global_arguments() {
        let runner = Arc::new(ScriptedRunner::new().stdout(
            "aws s3api list-buckets --output json --region eu-central-1 --profile ops",
            r#"{"Buckets": []}"#,
        ));
        let client = AwsClient::builder(AwsSettings::new("eu-central-1", "ops"))
            .runner(runner.clone())
            .build();

        let value: serde_json::Value = client.call("s3api", "list-buckets", &[]).await.unwrap();
        assert_eq!(value["Buckets"], serde_json::json!([]));
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn call_surfaces_cli_errors() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            "aws rds describe-db-instances --output json --region us-east-1",
            254,
            "An error occurred (AccessDenied)",
        ));
        let client = AwsClient::builder(AwsSettings::default())
            .runner(runner)
            .build();

        let err = client
            .call::<serde_json::Value>("rds", "describe-db-instances", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::CommandFailed { code: Some(254), .. }));
    }
}
