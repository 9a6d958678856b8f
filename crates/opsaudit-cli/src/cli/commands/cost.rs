//! `opsaudit cost` - Compare AWS spend between two periods.

use anyhow::{bail, Result};
use chrono::Local;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use opsaudit_client::api::Granularity;
use opsaudit_client::AwsClient;
use opsaudit_core::{
    first_of_month, CostAdvice, CostComparison, DateRange, MoverKind, PeriodCosts, Periods,
    ServiceCost,
};
use std::io::IsTerminal;
use tabled::{Table, Tabled, settings::Style};
use tracing::info;

use super::{aws_preconditions, Context};
use crate::cli::args::CostArgs;
use crate::output::{self, OutputFormat, ReportWriter};

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Tabled)]
struct MoverRow {
    #[tabled(rename = "")]
    arrow: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Previous")]
    previous: String,
    #[tabled(rename = "Projected")]
    projected: String,
    #[tabled(rename = "Change")]
    delta: String,
    #[tabled(rename = "%")]
    percent: String,
}

pub async fn execute(ctx: Context, args: CostArgs) -> Result<()> {
    // Dates are validated before anything touches AWS
    let periods = if args.dates.is_empty() {
        prompt_periods()?
    } else {
        Periods::from_args(&args.dates)?
    };
    info!(current = %periods.current, previous = %periods.previous, "cost periods");

    let client = ctx.aws_client();
    aws_preconditions(&client).await?;

    let comparison = fetch(&client, periods).await?;
    let top = args.top.unwrap_or(ctx.config.top);

    match ctx.output_format {
        OutputFormat::Pretty => {
            let mut out = ReportWriter::console();
            print_pretty(&mut out, &comparison, top)?;
            out.finish()?;
        }
        format => output::print_structured(format, &comparison.summary())?,
    }
    Ok(())
}

/// Current period by day, previous period by month. Any failure aborts.
pub async fn fetch(client: &AwsClient, periods: Periods) -> Result<CostComparison> {
    let cost = client.cost();
    let current = cost.by_service(&periods.current, Granularity::Daily).await?;
    let previous = cost.by_service(&periods.previous, Granularity::Monthly).await?;

    Ok(CostComparison::new(
        PeriodCosts::new(periods.current, current),
        PeriodCosts::new(periods.previous, previous),
    ))
}

fn prompt_periods() -> Result<Periods> {
    if !std::io::stdin().is_terminal() {
        bail!(
            "no dates given and stdin is not a terminal\n\n\
             Usage:\n  \
             opsaudit cost CUR_START CUR_END\n  \
             opsaudit cost PREV_START PREV_END CUR_START CUR_END"
        );
    }

    let theme = ColorfulTheme::default();
    let today = Local::now().date_naive();

    println!("{}", "Current period (end date is exclusive)".bold());
    let current = prompt_range(&theme, first_of_month(today).to_string(), today.to_string())?;

    let derive = Confirm::with_theme(&theme)
        .with_prompt(format!(
            "Compare against the preceding {} day(s) ({})?",
            current.days(),
            current.preceding()
        ))
        .default(true)
        .interact()?;

    if derive {
        return Ok(Periods::derived(current));
    }

    println!("{}", "Previous period".bold());
    let previous = current.preceding();
    let previous = prompt_range(&theme, previous.start_str(), previous.end_str())?;
    Ok(Periods { previous, current })
}

/// Ask for a start and end until they form a valid range
fn prompt_range(theme: &ColorfulTheme, start: String, end: String) -> Result<DateRange> {
    loop {
        let start: String = Input::with_theme(theme)
            .with_prompt("Start (YYYY-MM-DD)")
            .default(start.clone())
            .validate_with(|s: &String| opsaudit_core::parse_date(s).map(drop).map_err(|e| e.to_string()))
            .interact_text()?;
        let end: String = Input::with_theme(theme)
            .with_prompt("End (YYYY-MM-DD)")
            .default(end.clone())
            .validate_with(|s: &String| opsaudit_core::parse_date(s).map(drop).map_err(|e| e.to_string()))
            .interact_text()?;

        match DateRange::parse(&start, &end) {
            Ok(range) => return Ok(range),
            Err(e) => println!("{} {e}", "✗".red().bold()),
        }
    }
}

fn service_rows(services: &[ServiceCost], total: f64, top: usize) -> Vec<ServiceRow> {
    services
        .iter()
        .take(top)
        .enumerate()
        .map(|(i, s)| ServiceRow {
            rank: i + 1,
            service: s.service.clone(),
            cost: output::money(s.amount),
            share: if total > 0.0 {
                format!("{:.1}%", s.amount / total * 100.0)
            } else {
                "-".to_string()
            },
        })
        .collect()
}

fn print_pretty(out: &mut ReportWriter, c: &CostComparison, top: usize) -> Result<()> {
    let summary = c.summary();

    out.line("AWS Cost Comparison".bold())?;
    out.line(format!("  {} {}", "Previous:".bold(), summary.previous_period))?;
    out.line(format!("  {} {}", "Current: ".bold(), summary.current_period))?;
    out.blank()?;

    out.line(output::heading("Summary"))?;
    out.line(format!("  {:<24} {}", "Previous period total", output::money(summary.previous_total)))?;
    out.line(format!("  {:<24} {}", "Current period total", output::money(summary.current_total)))?;
    out.line(format!("  {:<24} {}", "Days in current period", summary.days))?;
    out.line(format!("  {:<24} {}", "Daily average", output::money(summary.daily_average)))?;
    out.line(format!(
        "  {:<24} {}",
        "Projected (30 days)",
        output::money(summary.projected).bold()
    ))?;
    let arrow = if summary.change > 0.0 { "↑" } else { "↓" };
    let change = format!(
        "{arrow} {} ({})",
        output::signed_money(summary.change),
        output::percent(summary.change_percent)
    );
    let change = if summary.change > 0.0 {
        change.red().bold()
    } else {
        change.green().bold()
    };
    out.line(format!("  {:<24} {change}", "Change vs previous"))?;

    for (title, services, total) in [
        ("Current period", &summary.current_services, summary.current_total),
        ("Previous period", &summary.previous_services, summary.previous_total),
    ] {
        out.blank()?;
        out.line(output::heading(&format!("Top {top} services: {title}")))?;
        if services.is_empty() {
            out.line(output::pass("No costs recorded"))?;
        } else {
            let rows = service_rows(services, total, top);
            out.line(Table::new(&rows).with(Style::rounded()))?;
        }
    }

    out.blank()?;
    out.line(output::heading("Biggest movers (projected vs previous)"))?;
    if summary.movers.is_empty() {
        out.line(output::pass("No service moved by more than $0.10"))?;
    } else {
        let rows: Vec<MoverRow> = summary
            .movers
            .iter()
            .map(|m| {
                let arrow = if m.kind.is_increase() {
                    m.kind.arrow().red().to_string()
                } else {
                    m.kind.arrow().green().to_string()
                };
                let service = match m.kind {
                    MoverKind::New => format!("{} [NEW]", m.service),
                    MoverKind::Gone => format!("{} [GONE]", m.service),
                    MoverKind::Increased | MoverKind::Decreased => m.service.clone(),
                };
                MoverRow {
                    arrow,
                    service,
                    previous: output::money(m.previous),
                    projected: output::money(m.projected),
                    delta: output::signed_money(m.delta),
                    percent: output::percent(m.percent),
                }
            })
            .collect();
        out.line(Table::new(&rows).with(Style::rounded()))?;
    }

    out.blank()?;
    out.line(output::heading("Recommendations"))?;
    if summary.recommendations.is_empty() {
        out.line(output::pass("Spend looks stable; nothing to flag"))?;
    }
    for advice in &summary.recommendations {
        let line = match advice {
            CostAdvice::Concentration { .. } | CostAdvice::Review { .. } => {
                output::warn(advice.message())
            }
            CostAdvice::Spike { .. } | CostAdvice::NewService { .. } => {
                output::fail(advice.message())
            }
        };
        out.line(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsaudit_client::{AwsSettings, ScriptedRunner};
    use std::sync::Arc;

    fn cost_json(groups: &[(&str, &str)]) -> String {
        let groups: Vec<String> = groups
            .iter()
            .map(|(service, amount)| {
                format!(
                    r#"{{"Keys":["{service}"],"Metrics":{{"UnblendedCost":{{"Amount":"{amount}","Unit":"USD"}}}}}}"#
                )
            })
            .collect();
        format!(
            r#"{{"ResultsByTime":[{{"Groups":[{}]}}]}}"#,
            groups.join(",")
        )
    }

    fn cmdline(range: &str, granularity: &str) -> String {
        format!(
            "aws ce get-cost-and-usage --time-period {range} --granularity {granularity} \
             --metrics UnblendedCost --group-by Type=DIMENSION,Key=SERVICE \
             --output json --region us-east-1"
        )
    }

    #[tokio::test]
    async fn fetch_builds_the_comparison() {
        let runner = ScriptedRunner::new()
            .stdout(
                &cmdline("Start=2024-03-01,End=2024-03-11", "DAILY"),
                &cost_json(&[("Amazon EC2", "60"), ("Amazon S3", "40")]),
            )
            .stdout(
                &cmdline("Start=2024-02-20,End=2024-03-01", "MONTHLY"),
                &cost_json(&[("Amazon EC2", "90")]),
            );
        let client = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build();
        let periods = Periods::from_args(&["2024-03-01", "2024-03-11"]).unwrap();

        let comparison = fetch(&client, periods).await.unwrap();
        assert!((comparison.current_total() - 100.0).abs() < 1e-9);
        assert!((comparison.projected() - 300.0).abs() < 1e-9);
        assert!((comparison.change() - 210.0).abs() < 1e-9);
        assert_eq!(comparison.movers()[0].service, "Amazon S3");
    }

    #[tokio::test]
    async fn api_failure_aborts() {
        let runner = ScriptedRunner::new().fail(
            &cmdline("Start=2024-03-01,End=2024-03-11", "DAILY"),
            255,
            "AccessDeniedException",
        );
        let client = AwsClient::builder(AwsSettings::default())
            .runner(Arc::new(runner))
            .build();
        let periods = Periods::from_args(&["2024-03-01", "2024-03-11"]).unwrap();

        let err = fetch(&client, periods).await.unwrap_err();
        assert!(err.to_string().contains("AccessDeniedException"));
    }

    #[test]
    fn rows_are_ranked_and_truncated() {
        let services = vec![
            ServiceCost {
                service: "A".into(),
                amount: 75.0,
            },
            ServiceCost {
                service: "B".into(),
                amount: 25.0,
            },
        ];
        let rows = service_rows(&services, 100.0, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].cost, "$75.00");
        assert_eq!(rows[0].share, "75.0%");
    }

    #[test]
    fn zero_previous_service_is_reported_as_new() {
        let range = DateRange::parse("2024-03-01", "2024-03-31").unwrap();
        let current: opsaudit_core::CostBreakdown = [("Tax".to_string(), 5.0)].into_iter().collect();
        let previous: opsaudit_core::CostBreakdown = [("Tax".to_string(), 0.0)].into_iter().collect();
        let comparison = CostComparison::new(
            PeriodCosts::new(range, current),
            PeriodCosts::new(range.preceding(), previous),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cost.txt");
        let mut out = ReportWriter::tee(&path).unwrap();
        print_pretty(&mut out, &comparison, 10).unwrap();
        out.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Tax [NEW]"));
        assert!(text.contains("Tax is new this period"));
        assert!(!text.contains("inf"));
    }
}
