//! AWS service API groups.

mod cost;
mod ec2;
mod elb;
mod lambda;
mod rds;
mod s3;
mod sts;

pub use cost::{CostApi, Granularity};
pub use ec2::Ec2Api;
pub use elb::ElbApi;
pub use lambda::LambdaApi;
pub use rds::RdsApi;
pub use s3::S3Api;
pub use sts::{CallerIdentity, StsApi};
