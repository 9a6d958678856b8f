//! Elastic Load Balancing endpoints.

use crate::AwsClient;
use opsaudit_core::{Resource, Result};
use serde::Deserialize;

/// Elastic Load Balancing API endpoints
pub struct ElbApi<'a> {
    client: &'a AwsClient,
}

impl<'a> ElbApi<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// Application, network and gateway load balancers
    pub async fn load_balancers(&self) -> Result<Vec<Resource>> {
        let response: DescribeLoadBalancersV2 = self
            .client
            .call("elbv2", "describe-load-balancers", &[])
            .await?;
        Ok(response
            .load_balancers
            .into_iter()
            .map(|lb| {
                let details = [lb.kind, lb.scheme]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                Resource {
                    id: lb.name,
                    details,
                    state: lb.state.map(|s| s.code).unwrap_or_default(),
                    created: lb.created_time,
                }
            })
            .collect())
    }

    /// Classic load balancers
    pub async fn classic_load_balancers(&self) -> Result<Vec<Resource>> {
        let response: DescribeLoadBalancersV1 = self
            .client
            .call("elb", "describe-load-balancers", &[])
            .await?;
        Ok(response
            .descriptions
            .into_iter()
            .map(|lb| Resource {
                id: lb.name,
                details: format!("{} instance(s)", lb.instances.len()),
                state: lb.scheme.unwrap_or_default(),
                created: lb.created_time,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct DescribeLoadBalancersV2 {
    #[serde(rename = "LoadBalancers", default)]
    load_balancers: Vec<LoadBalancerV2>,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerV2 {
    #[serde(rename = "LoadBalancerName")]
    name: String,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(rename = "Scheme", default)]
    scheme: Option<String>,
    #[serde(rename = "State", default)]
    state: Option<LoadBalancerState>,
    #[serde(rename = "CreatedTime", default)]
    created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerState {
    #[serde(rename = "Code")]
    code: String,
}

#[derive(Debug, Deserialize)]
struct DescribeLoadBalancersV1 {
    #[serde(rename = "LoadBalancerDescriptions", default)]
    descriptions: Vec<LoadBalancerV1>,
}

#[derive(Debug, Deserialize)]
struct LoadBalancerV1 {
    #[serde(rename = "LoadBalancerName")]
    name: String,
    #[serde(rename = "Scheme", default)]
    scheme: Option<String>,
    #[serde(rename = "Instances", default)]
    instances: Vec<serde_json::Value>,
    #[serde(rename = "CreatedTime", default)]
    created_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::{AwsClient, AwsSettings, ScriptedRunner};
    use std::sync::Arc;

    #[tokio::test]
    async fn parses_both_generations() {
        let runner = ScriptedRunner::new()
            .stdout(
                "aws elbv2 describe-load-balancers --output json --region us-east-1",
                r#"{"LoadBalancers": [{
                    "LoadBalancerName": "api", "Type": "application",
                    "Scheme": "internet-facing", "State": {"Code": "active"},
                    "DNSName": "api-1.us-east-1.elb.amazonaws.com"
                }]}"#,
            )
            .stdout(
                "aws elb describe-load-balancers --output json --region us-east-1",
                r#"{"LoadBalancerDescriptions": [{
                    "LoadBalancerName": "legacy", "Scheme": "internal",
                    "Instances": [{"InstanceId": "i-1"}, {"InstanceId": "i-2"}]
                }]}"#,
            );
        let client = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build();

        let v2 = client.elb().load_balancers().await.unwrap();
        assert_eq!(v2[0].details, "application, internet-facing");
        assert_eq!(v2[0].state, "active");

        let v1 = client.elb().classic_load_balancers().await.unwrap();
        assert_eq!(v1[0].id, "legacy");
        assert_eq!(v1[0].details, "2 instance(s)");
    }
}
