use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use verdant_core::{Clock, FixedClock, LoadOutcome, SensorSeriesController, SystemClock};

mod cli;
mod config;
mod format;
mod source;

use cli::{Cli, Commands, OutputFormat};
use config::Config;
use format::FormatOptions;
use source::FileSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
    .context("Failed to load configuration")?;
    config.validate()?;

    let opts = FormatOptions::new(cli.no_color).with_compact(cli.compact);
    let table = config.range_table();

    match cli.command {
        Commands::Summary {
            input,
            sensor,
            id,
            range,
            now,
            timezone,
            format,
        } => {
            let clock: Arc<dyn Clock> = match now {
                Some(now) => Arc::new(FixedClock(now)),
                None => Arc::new(SystemClock),
            };
            let source = FileSource::new(input);
            tracing::debug!("Reading {} from {}", sensor, source.path().display());

            let zone = timezone.unwrap_or_else(|| config.zone());
            let options = config.controller_options().zone(zone).initial_range(range);
            let controller = SensorSeriesController::new(id.as_str(), sensor, source)
                .with_options(options)?
                .with_table(Arc::new(table))
                .with_clock(clock);

            let outcome = controller.mount().await;
            let view = controller.view();

            let output = match format {
                OutputFormat::Text => format::format_summary_text(&id, sensor, &view, &opts),
                OutputFormat::Json => format::format_summary_json(&id, sensor, &view, &opts)?,
            };
            print!("{}", output);

            if outcome == LoadOutcome::Failed {
                let reason = view
                    .last_error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "unknown error".to_string());
                bail!("Failed to load readings: {}", reason);
            }
        }
        Commands::Classify {
            sensor,
            value,
            format,
        } => {
            let status = table.classify(value, sensor);
            let output = match format {
                OutputFormat::Text => format::format_classification_text(value, sensor, status, &opts),
                OutputFormat::Json => {
                    format::format_classification_json(value, sensor, status, &opts)?
                }
            };
            print!("{}", output);
        }
        Commands::Ranges { format } => {
            let output = match format {
                OutputFormat::Text => format::format_ranges_text(&table),
                OutputFormat::Json => format::format_ranges_json(&table, &opts)?,
            };
            print!("{}", output);
        }
    }

    Ok(())
}
