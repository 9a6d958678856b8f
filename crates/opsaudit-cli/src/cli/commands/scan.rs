//! `opsaudit scan` - List billable AWS resources.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use opsaudit_client::api::CallerIdentity;
use opsaudit_client::AwsClient;
use opsaudit_core::{Resource, ResourceKind, ScanSummary};
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};
use tracing::warn;

use super::{aws_preconditions, Context};
use crate::cli::args::ScanArgs;
use crate::output::{self, OutputFormat, ReportWriter};

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Details")]
    details: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Resource> for ResourceRow {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id.clone(),
            details: r.details.clone(),
            state: r.state.clone(),
            created: r.created.clone().unwrap_or_default(),
        }
    }
}

pub async fn execute(ctx: Context, args: ScanArgs) -> Result<()> {
    let client = ctx.aws_client();
    let identity = aws_preconditions(&client).await?;

    let summary = scan_all(&client, Some(identity.account.clone())).await;

    let mut out = if args.no_report {
        ReportWriter::console()
    } else {
        let dir = args
            .report_dir
            .or_else(|| ctx.config.report_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;
        let name = format!("aws-resources-{}.txt", Local::now().format("%Y%m%d-%H%M%S"));
        ReportWriter::tee(&dir.join(name))?
    };

    match ctx.output_format {
        OutputFormat::Json => out.line(serde_json::to_string_pretty(&summary)?)?,
        OutputFormat::Yaml => out.line(serde_yaml::to_string(&summary)?.trim_end())?,
        OutputFormat::Pretty => print_pretty(&mut out, &summary, &identity)?,
    }

    if let Some(path) = out.finish()? {
        if ctx.is_pretty() {
            let mut note = ReportWriter::console();
            note.blank()?;
            note.line(format!("Report saved to {}", path.display().to_string().cyan()))?;
        } else {
            eprintln!("Report saved to {}", path.display());
        }
    }
    Ok(())
}

/// Query every resource kind in order. Failed queries count as zero.
pub async fn scan_all(client: &AwsClient, account: Option<String>) -> ScanSummary {
    let mut summary = ScanSummary::new(client.region(), account);

    for kind in ResourceKind::ALL {
        let outcome = match kind {
            ResourceKind::Ec2Instance => client.ec2().running_instances().await,
            ResourceKind::ElasticIp => client.ec2().unassociated_addresses().await,
            ResourceKind::EbsVolume => client.ec2().unattached_volumes().await,
            ResourceKind::LambdaFunction => client.lambda().functions().await,
            ResourceKind::S3Bucket => client.s3().buckets().await,
            ResourceKind::NatGateway => client.ec2().available_nat_gateways().await,
            ResourceKind::LoadBalancer => client.elb().load_balancers().await,
            ResourceKind::ClassicLoadBalancer => client.elb().classic_load_balancers().await,
            ResourceKind::RdsInstance => client.rds().db_instances().await,
        };
        if let Err(e) = &outcome {
            warn!(kind = ?kind, error = %e, "resource query failed, counting as zero");
        }
        summary.record(kind, outcome);
    }
    summary
}

fn print_pretty(out: &mut ReportWriter, summary: &ScanSummary, identity: &CallerIdentity) -> Result<()> {
    out.line(format!("{}", "AWS Billable Resource Scan".bold()))?;
    out.line(format!("  {} {}", "Account:".bold(), identity.account))?;
    out.line(format!("  {} {}", "Caller:".bold(), identity.arn))?;
    out.line(format!("  {} {}", "Region:".bold(), summary.region.cyan()))?;
    out.line(format!(
        "  {} {}",
        "Started:".bold(),
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ))?;

    for report in &summary.kinds {
        out.blank()?;
        out.line(output::heading(report.kind.title()))?;

        if let Some(err) = &report.error {
            out.line(output::fail(format!("Query failed: {}", err.dimmed())))?;
        }
        if report.is_clear() {
            out.line(output::pass(format!("No {}", report.kind.noun())))?;
            continue;
        }

        out.line(output::warn(format!(
            "Found {} {}",
            report.count().to_string().yellow().bold(),
            report.kind.noun()
        )))?;
        let rows: Vec<ResourceRow> = report.resources.iter().map(ResourceRow::from).collect();
        out.line(Table::new(&rows).with(Style::rounded()).to_string())?;
    }

    out.blank()?;
    let total = summary.total();
    let verdict = if total == 0 {
        output::pass("No billable resources found".green().bold())
    } else {
        output::warn(
            format!("{total} billable resource(s) found; review them to avoid unexpected charges")
                .yellow()
                .bold(),
        )
    };
    out.line(verdict)?;

    let failed = summary.failed().count();
    if failed > 0 {
        out.line(output::fail(format!(
            "{failed} quer{} failed and counted as zero; rerun with -v for details",
            if failed == 1 { "y" } else { "ies" }
        )))?;
    }
    Ok(())
}
