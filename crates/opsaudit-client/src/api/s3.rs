//! S3 endpoints.

use crate::AwsClient;
use opsaudit_core::{Resource, Result};
use serde::Deserialize;

/// S3 API endpoints
pub struct S3Api<'a> {
    client: &'a AwsClient,
}

impl<'a> S3Api<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// All buckets owned by the account (S3 listing is global)
    pub async fn buckets(&self) -> Result<Vec<Resource>> {
        let response: ListBuckets = self.client.call("s3api", "list-buckets", &[]).await?;
        Ok(response
            .buckets
            .into_iter()
            .map(|b| Resource {
                id: b.name,
                details: String::new(),
                state: String::new(),
                created: b.creation_date,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBuckets {
    #[serde(default)]
    buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Bucket {
    name: String,
    #[serde(default)]
    creation_date: Option<String>,
}
