use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod report;
mod translate;

use report::ReportCommands;

#[derive(Debug, Parser)]
#[command(name = "cobipedia")]
#[command(about = "Cobipedia localization sync and catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Translate source-locale entries into the target locales
    Translate {
        /// Translate and log payloads without writing to Strapi
        #[arg(long)]
        dry_run: bool,
        /// Skip entries the progress file already marks complete
        #[arg(long)]
        resume: bool,
        /// Process at most N entries per content type (0 for no cap)
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Only translate into this locale (e.g. en)
        #[arg(long)]
        locale: Option<String>,
        /// Only process this content type (e.g. set)
        #[arg(long = "type", value_name = "TYPE")]
        content_type: Option<String>,
    },
    /// Verify Strapi and the model API are reachable
    Check,
    /// Catalog reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cobipedia_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Translate {
            dry_run,
            resume,
            limit,
            locale,
            content_type,
        } => {
            let args = translate::TranslateArgs {
                dry_run,
                resume,
                limit,
                locale,
                content_type,
            };
            translate::run_translate(&config, args).await?;
        }
        Commands::Check => translate::run_check(&config).await?,
        Commands::Report { command } => match command {
            ReportCommands::Quality { json } => report::run_quality_report(&config, json).await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests;
