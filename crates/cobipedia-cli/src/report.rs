//! `report` command handlers.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use cobipedia_core::AppConfig;
use cobipedia_pipeline::{build_report, fetch_quality_sets, QualityReport};
use cobipedia_strapi::StrapiClient;

const BAR_WIDTH: usize = 20;
const RULE_WIDTH: usize = 50;

/// Sub-commands available under `report`.
#[derive(Debug, Subcommand)]
pub enum ReportCommands {
    /// Score every set for data completeness
    Quality {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Fetch all source-locale sets and print their completeness report.
///
/// # Errors
///
/// Returns an error if the Strapi client cannot be built or any page fails.
pub(crate) async fn run_quality_report(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let store = StrapiClient::from_config(config).context("failed to build Strapi client")?;
    let documents = fetch_quality_sets(
        &store,
        &config.source_locale,
        Duration::from_millis(config.write_delay_ms),
    )
    .await?;
    tracing::info!(count = documents.len(), "sets loaded");

    let report = build_report(&documents);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_quality_text(&report));
    }
    Ok(())
}

/// `█` for every 5 percent (rounded), padded with `░`.
fn bar(percent: u32) -> String {
    let filled = usize::try_from((2 * percent + 5) / 10)
        .unwrap_or(BAR_WIDTH)
        .min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub(crate) fn render_quality_text(report: &QualityReport) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "Data quality report: {} sets\n", report.total_sets);
    let _ = writeln!(out, "Field coverage:\n{rule}");
    for (_, stat) in &report.field_stats {
        let _ = writeln!(
            out,
            "  {:<18} {} {}% ({}/{})",
            stat.label,
            bar(stat.percent),
            stat.percent,
            stat.filled,
            report.total_sets
        );
    }

    let _ = writeln!(out, "\nAverage completeness: {}%", report.average_score);

    let _ = writeln!(out, "\nLowest completeness:\n{rule}");
    for set in report.worst() {
        let _ = writeln!(out, "  {:<8} {}% {}", set.set_number, set.score, set.name);
        if !set.missing.is_empty() {
            let _ = writeln!(out, "           missing: {}", set.missing.join(", "));
        }
    }

    let _ = writeln!(
        out,
        "\nComplete sets (100%): {}/{}",
        report.perfect_count(),
        report.total_sets
    );
    out
}
