//! RDS endpoints.

use crate::AwsClient;
use opsaudit_core::{Resource, Result};
use serde::Deserialize;

/// RDS API endpoints
pub struct RdsApi<'a> {
    client: &'a AwsClient,
}

impl<'a> RdsApi<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// All DB instances, whatever their status
    pub async fn db_instances(&self) -> Result<Vec<Resource>> {
        let response: DescribeDbInstances = self
            .client
            .call("rds", "describe-db-instances", &[])
            .await?;
        Ok(response
            .db_instances
            .into_iter()
            .map(|db| {
                let details = [db.class, db.engine]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                Resource {
                    id: db.identifier,
                    details,
                    state: db.status.unwrap_or_default(),
                    created: db.created,
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct DescribeDbInstances {
    #[serde(rename = "DBInstances", default)]
    db_instances: Vec<DbInstance>,
}

#[derive(Debug, Deserialize)]
struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    identifier: String,
    #[serde(rename = "DBInstanceClass", default)]
    class: Option<String>,
    #[serde(rename = "Engine", default)]
    engine: Option<String>,
    #[serde(rename = "DBInstanceStatus", default)]
    status: Option<String>,
    #[serde(rename = "InstanceCreateTime", default)]
    created: Option<String>,
}
