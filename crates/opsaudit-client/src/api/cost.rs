//! Cost Explorer endpoints.

use crate::AwsClient;
use opsaudit_core::{CostBreakdown, DateRange, OpsError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Metric requested from Cost Explorer
const METRIC: &str = "UnblendedCost";

/// Time bucket size for a cost query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One result per day
    Daily,
    /// One result per calendar month
    Monthly,
}

impl Granularity {
    /// Value passed to `--granularity`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Monthly => "MONTHLY",
        }
    }
}

/// Cost Explorer API endpoints
pub struct CostApi<'a> {
    client: &'a AwsClient,
}

impl<'a> CostApi<'a> {
    pub(crate) fn new(client: &'a AwsClient) -> Self {
        Self { client }
    }

    /// Unblended cost per service over `range`, summed across all time buckets.
    ///
    /// The end date is exclusive.
    pub async fn by_service(&self, range: &DateRange, granularity: Granularity) -> Result<CostBreakdown> {
        let period = format!("Start={},End={}", range.start_str(), range.end_str());
        let response: CostAndUsage = self
            .client
            .call(
                "ce",
                "get-cost-and-usage",
                &[
                    "--time-period",
                    period.as_str(),
                    "--granularity",
                    granularity.as_str(),
                    "--metrics",
                    METRIC,
                    "--group-by",
                    "Type=DIMENSION,Key=SERVICE",
                ],
            )
            .await?;

        let mut breakdown = CostBreakdown::new();
        for bucket in response.results_by_time {
            for group in bucket.groups {
                let Some(service) = group.keys.into_iter().next() else {
                    continue;
                };
                let Some(metric) = group.metrics.get(METRIC) else {
                    continue;
                };
                let amount: f64 = metric
                    .amount
                    .parse()
                    .map_err(|e| OpsError::parse(format!("cost amount for {service}"), e))?;
                breakdown.add(service, amount);
            }
        }
        debug!(
            range = %range,
            services = breakdown.len(),
            total = breakdown.total(),
            "cost breakdown"
        );
        Ok(breakdown)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CostAndUsage {
    #[serde(default)]
    results_by_time: Vec<TimeBucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TimeBucket {
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Group {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    metrics: HashMap<String, Metric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Metric {
    amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AwsSettings, ScriptedRunner};
    use std::sync::Arc;

    const DAILY: &str = "aws ce get-cost-and-usage --time-period Start=2024-03-01,End=2024-03-03 \
        --granularity DAILY --metrics UnblendedCost --group-by Type=DIMENSION,Key=SERVICE \
        --output json --region us-east-1";

    fn group(service: &str, amount: &str) -> String {
        format!(
            r#"{{"Keys": ["{service}"], "Metrics": {{"UnblendedCost": {{"Amount": "{amount}", "Unit": "USD"}}}}}}"#
        )
    }

    #[tokio::test]
    async fn sums_services_across_days() {
        let json = format!(
            r#"{{"ResultsByTime": [
                {{"TimePeriod": {{"Start": "2024-03-01", "End": "2024-03-02"}}, "Groups": [{}, {}]}},
                {{"TimePeriod": {{"Start": "2024-03-02", "End": "2024-03-03"}}, "Groups": [{}]}}
            ]}}"#,
            group("Amazon Elastic Compute Cloud - Compute", "12.5"),
            group("Amazon Simple Storage Service", "0.25"),
            group("Amazon Elastic Compute Cloud - Compute", "7.5"),
        );
        let runner = ScriptedRunner::new().stdout(DAILY, &json);
        let client = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build();

        let range = DateRange::parse("2024-03-01", "2024-03-03").unwrap();
        let breakdown = client.cost().by_service(&range, Granularity::Daily).await.unwrap();

        assert_eq!(breakdown.len(), 2);
        assert!((breakdown.get("Amazon Elastic Compute Cloud - Compute").unwrap() - 20.0).abs() < 1e-9);
        assert!((breakdown.total() - 20.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_results_give_empty_breakdown() {
        let cmd = DAILY.replace("DAILY", "MONTHLY");
        let runner = ScriptedRunner::new().stdout(&cmd, r#"{"ResultsByTime": [{"Groups": []}]}"#);
        let client = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build();

        let range = DateRange::parse("2024-03-01", "2024-03-03").unwrap();
        let breakdown = client.cost().by_service(&range, Granularity::Monthly).await.unwrap();
        assert!(breakdown.is_empty());
    }

    #[tokio::test]
    async fn malformed_amount_is_a_parse_error() {
        let json = format!(r#"{{"ResultsByTime": [{{"Groups": [{}]}}]}}"#, group("AWS Lambda", "n/a"));
        let runner = ScriptedRunner::new().stdout(DAILY, &json);
        let client = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build();

        let range = DateRange::parse("2024-03-01", "2024-03-03").unwrap();
        let err = client.cost().by_service(&range, Granularity::Daily).await.unwrap_err();
        assert!(matches!(err, OpsError::Parse { .. }));
    }
}
