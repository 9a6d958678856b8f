use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kinds of AWS resource that keep billing while they exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Running EC2 instances
    Ec2Instance,
    /// Elastic IPs not associated with anything
    ElasticIp,
    /// EBS volumes not attached to an instance
    EbsVolume,
    /// Lambda functions
    LambdaFunction,
    /// S3 buckets
    S3Bucket,
    /// Available NAT gateways
    NatGateway,
    /// Application/network/gateway load balancers
    LoadBalancer,
    /// Classic (v1) load balancers
    ClassicLoadBalancer,
    /// RDS database instances
    RdsInstance,
}

impl ResourceKind {
    /// Scan order
    pub const ALL: [Self; 9] = [
        Self::Ec2Instance,
        Self::ElasticIp,
        Self::EbsVolume,
        Self::LambdaFunction,
        Self::S3Bucket,
        Self::NatGateway,
        Self::LoadBalancer,
        Self::ClassicLoadBalancer,
        Self::RdsInstance,
    ];

    /// Section heading
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Ec2Instance => "EC2 Instances (running)",
            Self::ElasticIp => "Elastic IPs (unassociated)",
            Self::EbsVolume => "EBS Volumes (unattached)",
            Self::LambdaFunction => "Lambda Functions",
            Self::S3Bucket => "S3 Buckets",
            Self::NatGateway => "NAT Gateways",
            Self::LoadBalancer => "Load Balancers (ALB/NLB)",
            Self::ClassicLoadBalancer => "Classic Load Balancers",
            Self::RdsInstance => "RDS Instances",
        }
    }

    /// Plural noun used in count lines ("Found 3 ...")
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Ec2Instance => "running EC2 instance(s)",
            Self::ElasticIp => "unassociated Elastic IP(s)",
            Self::EbsVolume => "unattached EBS volume(s)",
            Self::LambdaFunction => "Lambda function(s)",
            Self::S3Bucket => "S3 bucket(s)",
            Self::NatGateway => "NAT gateway(s)",
            Self::LoadBalancer => "load balancer(s)",
            Self::ClassicLoadBalancer => "classic load balancer(s)",
            Self::RdsInstance => "RDS instance(s)",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// One billable resource, flattened to the columns the report prints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier (instance ID, bucket name, ...)
    pub id: String,
    /// Kind-specific detail (type, size, runtime, ...)
    #[serde(default)]
    pub details: String,
    /// Lifecycle state, when the API reports one
    #[serde(default)]
    pub state: String,
    /// Creation or launch time as reported
    #[serde(default)]
    pub created: Option<String>,
}

/// Scan result for a single resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindReport {
    /// Which kind
    pub kind: ResourceKind,
    /// Items found
    pub resources: Vec<Resource>,
    /// Query error, if the lookup failed and was counted as zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KindReport {
    /// Number of items found
    #[must_use]
    pub fn count(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if nothing billable was found
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Results of a full resource scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Account the scan ran against
    pub account: Option<String>,
    /// Region scanned
    pub region: String,
    /// When the scan started
    pub started_at: DateTime<Utc>,
    /// Per-kind results, in scan order
    pub kinds: Vec<KindReport>,
}

impl ScanSummary {
    /// Start an empty summary
    #[must_use]
    pub fn new(region: impl Into<String>, account: Option<String>) -> Self {
        Self {
            account,
            region: region.into(),
            started_at: Utc::now(),
            kinds: Vec::new(),
        }
    }

    /// Record the outcome of one query. A failed query counts as zero.
    pub fn record(&mut self, kind: ResourceKind, outcome: Result<Vec<Resource>>) -> &KindReport {
        let report = match outcome {
            Ok(resources) => KindReport {
                kind,
                resources,
                error: None,
            },
            Err(e) => KindReport {
                kind,
                resources: Vec::new(),
                error: Some(e.to_string()),
            },
        };
        self.kinds.push(report);
        &self.kinds[self.kinds.len() - 1]
    }

    /// Sum of all counts
    #[must_use]
    pub fn total(&self) -> usize {
        self.kinds.iter().map(KindReport::count).sum()
    }

    /// Kinds whose query failed
    pub fn failed(&self) -> impl Iterator<Item = &KindReport> {
        self.kinds.iter().filter(|k| k.error.is_some())
    }
}
