//! EC2 endpoints.

use crate::AwsClient;
use opsaudit_core::{Resource, Result};
use serde::Deserialize;

/// EC2 API endpoints
pub struct Ec2Api<'a> {
    client: &'a AwsClient,
}

impl<'a> Ec2Api<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// Instances in the `running` state
    pub async fn running_instances(&self) -> Result<Vec<Resource>> {
        let response: DescribeInstances = self
            .client
            .call(
                "ec2",
                "describe-instances",
                &["--filters", "Name=instance-state-name,Values=running"],
            )
            .await?;
        Ok(response
            .reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .map(Instance::into_resource)
            .collect())
    }

    /// Elastic IPs with no association
    pub async fn unassociated_addresses(&self) -> Result<Vec<Resource>> {
        let response: DescribeAddresses = self
            .client
            .call("ec2", "describe-addresses", &[])
            .await?;
        Ok(response
            .addresses
            .into_iter()
            .filter(|a| a.association_id.is_none())
            .map(Address::into_resource)
            .collect())
    }

    /// EBS volumes in the `available` (unattached) state
    pub async fn unattached_volumes(&self) -> Result<Vec<Resource>> {
        let response: DescribeVolumes = self
            .client
            .call(
                "ec2",
                "describe-volumes",
                &["--filters", "Name=status,Values=available"],
            )
            .await?;
        Ok(response
            .volumes
            .into_iter()
            .map(Volume::into_resource)
            .collect())
    }

    /// NAT gateways in the `available` state
    pub async fn available_nat_gateways(&self) -> Result<Vec<Resource>> {
        let response: DescribeNatGateways = self
            .client
            .call(
                "ec2",
                "describe-nat-gateways",
                &["--filter", "Name=state,Values=available"],
            )
            .await?;
        Ok(response
            .nat_gateways
            .into_iter()
            .map(NatGateway::into_resource)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstances {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Instance {
    instance_id: String,
    #[serde(default)]
    instance_type: Option<String>,
    #[serde(default)]
    state: Option<InstanceState>,
    #[serde(default)]
    launch_time: Option<String>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceState {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: String,
    value: String,
}

impl Instance {
    fn into_resource(self) -> Resource {
        let name = self
            .tags
            .iter()
            .find(|t| t.key == "Name")
            .map(|t| t.value.clone());
        let kind = self.instance_type.unwrap_or_default();
        let details = match name {
            Some(name) => format!("{kind} ({name})"),
            None => kind,
        };
        Resource {
            id: self.instance_id,
            details,
            state: self.state.map(|s| s.name).unwrap_or_default(),
            created: self.launch_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAddresses {
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Address {
    #[serde(default)]
    public_ip: Option<String>,
    #[serde(default)]
    allocation_id: Option<String>,
    #[serde(default)]
    association_id: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

impl Address {
    fn into_resource(self) -> Resource {
        Resource {
            id: self
                .public_ip
                .clone()
                .or_else(|| self.allocation_id.clone())
                .unwrap_or_default(),
            details: self.allocation_id.unwrap_or_default(),
            state: self.domain.unwrap_or_default(),
            created: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeVolumes {
    #[serde(default)]
    volumes: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Volume {
    volume_id: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    volume_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    create_time: Option<String>,
}

impl Volume {
    fn into_resource(self) -> Resource {
        let size = self.size.map(|s| format!("{s} GiB")).unwrap_or_default();
        let details = match self.volume_type {
            Some(t) => format!("{size} {t}").trim().to_string(),
            None => size,
        };
        Resource {
            id: self.volume_id,
            details,
            state: self.state.unwrap_or_default(),
            created: self.create_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeNatGateways {
    #[serde(default)]
    nat_gateways: Vec<NatGateway>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NatGateway {
    nat_gateway_id: String,
    #[serde(default)]
    vpc_id: Option<String>,
    #[serde(default)]
    subnet_id: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    create_time: Option<String>,
}

impl NatGateway {
    fn into_resource(self) -> Resource {
        let details = [self.vpc_id, self.subnet_id]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        Resource {
            id: self.nat_gateway_id,
            details,
            state: self.state.unwrap_or_default(),
            created: self.create_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{AwsClient, AwsSettings, ScriptedRunner};
    use std::sync::Arc;

    fn client(runner: ScriptedRunner) -> AwsClient {
        AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build()
    }

    #[tokio::test]
    async fn running_instances_flatten_reservations() {
        let json = r#"{
            "Reservations": [
                {"Instances": [
                    {"InstanceId": "i-0abc", "InstanceType": "t3.micro",
                     "State": {"Code": 16, "Name": "running"},
                     "LaunchTime": "2024-02-01T10:00:00+00:00",
                     "Tags": [{"Key": "Name", "Value": "web-1"}]}
                ]},
                {"Instances": [
                    {"InstanceId": "i-0def", "InstanceType": "m5.large",
                     "State": {"Code": 16, "Name": "running"}}
                ]}
            ]
        }"#;
        let c = client(ScriptedRunner::new().stdout(
            "aws ec2 describe-instances --filters Name=instance-state-name,Values=running --output json --region us-east-1",
            json,
        ));

        let instances = c.ec2().running_instances().await.unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].id, "i-0abc");
        assert_eq!(instances[0].details, "t3.micro (web-1)");
        assert_eq!(instances[0].state, "running");
        assert_eq!(instances[1].details, "m5.large");
        assert!(instances[1].created.is_none());
    }

    #[tokio::test]
    async fn associated_addresses_are_skipped() {
        let json = r#"{"Addresses": [
            {"PublicIp": "203.0.113.10", "AllocationId": "eipalloc-1", "Domain": "vpc"},
            {"PublicIp": "203.0.113.11", "AllocationId": "eipalloc-2", "AssociationId": "eipassoc-9", "Domain": "vpc"}
        ]}"#;
        let c = client(ScriptedRunner::new().stdout(
            "aws ec2 describe-addresses --output json --region us-east-1",
            json,
        ));

        let addrs = c.ec2().unassociated_addresses().await.unwrap();
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].id, "203.0.113.10");
        assert_eq!(addrs[0].details, "eipalloc-1");
    }

    #[tokio::test]
    async fn empty_volume_listing_is_zero() {
        let c = client(ScriptedRunner::new().stdout(
            "aws ec2 describe-volumes --filters Name=status,Values=available --output json --region us-east-1",
            r#"{"Volumes": []}"#,
        ));
        assert!(c.ec2().unattached_volumes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn volumes_and_nat_gateways_map_details() {
        let c = client(
            ScriptedRunner::new()
                .stdout(
                    "aws ec2 describe-volumes --filters Name=status,Values=available --output json --region us-east-1",
                    r#"{"Volumes": [{"VolumeId": "vol-1", "Size": 100, "VolumeType": "gp3", "State": "available"}]}"#,
                )
                .stdout(
                    "aws ec2 describe-nat-gateways --filter Name=state,Values=available --output json --region us-east-1",
                    r#"{"NatGateways": [{"NatGatewayId": "nat-1", "VpcId": "vpc-1", "SubnetId": "subnet-1", "State": "available"}]}"#,
                ),
        );

        let vols = c.ec2().unattached_volumes().await.unwrap();
        assert_eq!(vols[0].details, "100 GiB gp3");

        let nats = c.ec2().available_nat_gateways().await.unwrap();
        assert_eq!(nats[0].id, "nat-1");
        assert_eq!(nats[0].details, "vpc-1 / subnet-1");
    }
}
