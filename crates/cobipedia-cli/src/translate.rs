//! `translate` and `check` command handlers.

use std::time::Instant;

use anyhow::Context;
use cobipedia_core::content_types::SET;
use cobipedia_core::AppConfig;
use cobipedia_pipeline::{
    Checkpoint, DiscardCheckpoint, LedgerFile, LedgerSummaryRow, Orchestrator, ProgressLedger,
    RunOptions, RunReport, TypeOutcome,
};
use cobipedia_strapi::{ContentStore, Query, StrapiClient};
use cobipedia_translate::AnthropicClient;

/// Flags of the `translate` command.
#[derive(Debug, Clone, Default)]
pub(crate) struct TranslateArgs {
    pub dry_run: bool,
    pub resume: bool,
    pub limit: Option<usize>,
    pub locale: Option<String>,
    pub content_type: Option<String>,
}

impl TranslateArgs {
    fn into_options(self, config: &AppConfig) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            resume: self.resume,
            limit: self.limit,
            locale_filter: self.locale,
            type_filter: self.content_type,
            ..RunOptions::from_config(config)
        }
    }
}

fn build_clients(config: &AppConfig) -> anyhow::Result<(StrapiClient, AnthropicClient)> {
    let store = StrapiClient::from_config(config).context("failed to build Strapi client")?;
    let translator =
        AnthropicClient::from_config(config).context("failed to build Anthropic client")?;
    Ok((store, translator))
}

/// Lists one source-locale set and sends a minimal model request; either
/// failure aborts.
async fn preflight(
    config: &AppConfig,
    store: &dyn ContentStore,
    translator: &AnthropicClient,
) -> anyhow::Result<()> {
    let query = Query::new().locale(&config.source_locale).page(1, 1);
    let page = store
        .find_many(SET.endpoint, &query)
        .await
        .with_context(|| format!("Strapi at {} is not reachable", config.strapi_url))?;
    println!(
        "Strapi OK: {} sets in locale {}",
        page.pagination.total, config.source_locale
    );

    let reply = translator
        .ping()
        .await
        .context("Anthropic API is not reachable")?;
    println!("Anthropic OK: {reply}");
    Ok(())
}

/// Verify both upstream services without translating anything.
///
/// # Errors
///
/// Returns an error if a client cannot be built or either service fails.
pub(crate) async fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let (store, translator) = build_clients(config)?;
    preflight(config, &store, &translator).await
}

/// Run the translation pipeline.
///
/// Without `--resume` the progress file starts empty and is overwritten on the
/// first checkpoint. Dry runs never touch the progress file.
///
/// # Errors
///
/// Returns an error if preflight fails, the progress file cannot be read or
/// written, or a client cannot be built. Per-entry failures are recorded in
/// the progress file, not propagated.
pub(crate) async fn run_translate(config: &AppConfig, args: TranslateArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    let (store, translator) = build_clients(config)?;
    let dry_run = args.dry_run;

    tracing::info!(
        strapi_url = %config.strapi_url,
        source_locale = %config.source_locale,
        targets = %args.locale.clone().unwrap_or_else(|| config.target_locales.join(",")),
        content_type = args.content_type.as_deref().unwrap_or("all"),
        dry_run,
        resume = args.resume,
        limit = ?args.limit,
        model_short = %config.model_short,
        model_long = %config.model_long,
        "starting translation run"
    );

    preflight(config, &store, &translator).await?;

    let ledger_file = LedgerFile::new(&config.progress_file);
    let mut ledger = if args.resume {
        let ledger = ledger_file
            .load()
            .with_context(|| format!("failed to load {}", ledger_file.path().display()))?;
        tracing::info!(path = %ledger_file.path().display(), "resuming from progress file");
        ledger
    } else {
        ProgressLedger::new()
    };

    let mut checkpoint: Box<dyn Checkpoint> = if dry_run {
        Box::new(DiscardCheckpoint)
    } else {
        Box::new(ledger_file.clone())
    };

    let options = args.into_options(config);
    let report = Orchestrator::new(&store, &translator, checkpoint.as_mut(), options)
        .run(&mut ledger)
        .await?;

    let minutes = started.elapsed().as_secs_f64() / 60.0;
    println!("\nFinished in {minutes:.1} min");
    if dry_run {
        println!("Dry run: nothing was written to Strapi");
    }
    for line in outcome_lines(&report) {
        println!("{line}");
    }
    println!("\nProgress:");
    for line in ledger_lines(&ledger.summary()) {
        println!("{line}");
    }
    if !dry_run {
        println!("Progress file: {}", ledger_file.path().display());
    }

    Ok(())
}

/// One line per content type and locale pass of this run.
pub(crate) fn outcome_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &report.types {
        match &entry.outcome {
            TypeOutcome::Completed(tallies) => {
                for t in tallies {
                    lines.push(format!(
                        "  {}/{}: {} translated, {} skipped, {} errors",
                        entry.content_type, t.locale, t.translated, t.skipped, t.errors
                    ));
                }
            }
            TypeOutcome::FetchFailed(message) => {
                lines.push(format!("  {}: fetch failed: {message}", entry.content_type));
            }
            TypeOutcome::NoEntries => {
                lines.push(format!("  {}: no entries", entry.content_type));
            }
            TypeOutcome::Unknown => {
                lines.push(format!("  {}: unknown content type", entry.content_type));
            }
        }
    }
    lines
}

pub(crate) fn ledger_lines(rows: &[LedgerSummaryRow]) -> Vec<String> {
    rows.iter()
        .map(|r| {
            format!(
                "  {}/{}: {} completed, {} errors",
                r.content_type, r.locale, r.completed, r.errors
            )
        })
        .collect()
}
