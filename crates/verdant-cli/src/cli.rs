//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use verdant_core::Zone;
use verdant_types::{SensorType, TimeRange};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON, pretty-printed unless `--compact` is set.
    Json,
}

#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about = "Classify and summarize garden sensor readings", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a window of readings from a JSON file
    Summary {
        /// JSON file with an array of {timestamp, value} readings
        #[arg(short, long)]
        input: PathBuf,

        /// Sensor type (temperature, humidity, soil-moisture, ...)
        #[arg(short, long)]
        sensor: SensorType,

        /// Sensor identifier used in logs and output
        #[arg(long, default_value = "sensor")]
        id: String,

        /// Time range (24h, 7d, 30d)
        #[arg(short, long, default_value = "24h")]
        range: TimeRange,

        /// Reference time (RFC 3339), defaults to the current time
        #[arg(long, value_parser = parse_rfc3339)]
        now: Option<OffsetDateTime>,

        /// Time zone for labels and days (IANA name, +HH:MM, UTC or local);
        /// overrides the config file
        #[arg(long, value_parser = parse_zone)]
        timezone: Option<Zone>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Classify a single value
    Classify {
        /// Sensor type (temperature, humidity, soil-moisture, ...)
        #[arg(short, long)]
        sensor: SensorType,

        /// Value to classify
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the effective optimal ranges
    Ranges {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339)
}

fn parse_zone(s: &str) -> Result<Zone, String> {
    s.parse().map_err(|e: verdant_core::Error| e.to_string())
}
