//! Client configuration types.

/// Region used when neither a flag, `AWS_REGION` nor the config file sets one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Profile used when neither a flag, `AWS_PROFILE` nor the config file sets one
pub const DEFAULT_PROFILE: &str = "default";

/// Name of the AWS CLI executable
pub const AWS_BINARY: &str = "aws";

/// Where and as whom AWS calls are made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    /// Region passed as `--region`
    pub region: String,

    /// Named profile passed as `--profile`
    pub profile: String,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl AwsSettings {
    /// Create settings for a region and profile
    pub fn new(region: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: profile.into(),
        }
    }

    /// Global CLI arguments for these settings.
    ///
    /// The default profile is left implicit so that credentials supplied only
    /// through environment variables keep working.
    #[must_use]
    pub fn global_args(&self) -> Vec<String> {
        let mut args = vec![
            "--output".to_string(),
            "json".to_string(),
            "--region".to_string(),
            self.region.clone(),
        ];
        if self.profile != DEFAULT_PROFILE {
            args.push("--profile".to_string());
            args.push(self.profile.clone());
        }
        args
    }
}
