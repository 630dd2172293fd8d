//! Output formatting for text and JSON output.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use verdant_core::{RangeTable, SensorViewModel, SeriesState};
use verdant_types::{SensorType, Status};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            compact: false,
        }
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Format a classification tier with color.
#[must_use]
pub fn format_status(status: Status, no_color: bool) -> String {
    let label = match status {
        Status::Normal => "NORMAL",
        Status::Warning => "WARNING",
        Status::Critical => "CRITICAL",
    };

    if no_color {
        format!("[{}]", label)
    } else {
        match status {
            Status::Normal => format!("[{}]", label.green()),
            Status::Warning => format!("[{}]", label.yellow()),
            Status::Critical => format!("[{}]", label.red().bold()),
        }
    }
}

/// Format a value with its unit, e.g. `21.5 °C` or `6.8 pH`.
#[must_use]
pub fn format_value(value: f64, sensor: SensorType) -> String {
    let precision = match sensor {
        SensorType::Light => 0,
        SensorType::SoilPh => 2,
        _ => 1,
    };
    format!("{:.*} {}", precision, value, sensor.unit())
}

fn format_state(state: SeriesState) -> &'static str {
    match state {
        SeriesState::Idle => "idle",
        SeriesState::Loading => "loading",
        SeriesState::Ready => "ready",
        SeriesState::Error => "error",
    }
}

// ============================================================================
// Summary formatting
// ============================================================================

pub fn format_summary_text(
    sensor_id: &str,
    sensor: SensorType,
    view: &SensorViewModel,
    opts: &FormatOptions,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({}) - last {}", sensor, sensor_id, view.range.label());
    if view.requested_range != view.range {
        let _ = writeln!(
            out,
            "State:    {} (requested {})",
            format_state(view.state),
            view.requested_range.label()
        );
    } else {
        let _ = writeln!(out, "State:    {}", format_state(view.state));
    }

    match view.current_value {
        Some(value) => {
            let _ = writeln!(
                out,
                "Current:  {} {}",
                format_value(value, sensor),
                format_status(view.current_status, opts.no_color)
            );
            let _ = writeln!(out, "          {}", view.current_status.action());
        }
        None => {
            let _ = writeln!(out, "Current:  no data");
        }
    }

    match &view.statistics {
        Some(stats) => {
            let _ = writeln!(out, "Readings: {}", stats.count);
            let _ = writeln!(out, "Min:      {}", format_value(stats.min, sensor));
            let _ = writeln!(out, "Max:      {}", format_value(stats.max, sensor));
            let _ = writeln!(out, "Mean:     {}", format_value(stats.mean, sensor));
            let _ = writeln!(out, "Std dev:  {:.2}", stats.std_dev);
        }
        None => {
            let _ = writeln!(out, "Readings: 0");
        }
    }

    let flagged = view
        .chart_statuses
        .iter()
        .filter(|s| **s != Status::Normal)
        .count();
    if flagged > 0 {
        let _ = writeln!(out, "Flagged:  {} of {} readings", flagged, view.chart_series.len());
    }

    if !view.chart_labels.is_empty() {
        let _ = writeln!(out, "Axis:     {}", view.chart_labels.join("  "));
    }

    if !view.daily_aggregates.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10} {:>10} {:>6}",
            "Date", "Min", "Max", "Mean", "Count"
        );
        for day in &view.daily_aggregates {
            let _ = writeln!(
                out,
                "{:<12} {:>10.1} {:>10.1} {:>10.1} {:>6}",
                day.date.to_string(),
                day.min,
                day.max,
                day.mean,
                day.count
            );
        }
    }

    if let Some(failure) = &view.last_error {
        let _ = writeln!(out);
        let message = format!("Last error: {}", failure);
        if opts.no_color {
            let _ = writeln!(out, "{}", message);
        } else {
            let _ = writeln!(out, "{}", message.red());
        }
    }

    out
}

pub fn format_summary_json(
    sensor_id: &str,
    sensor: SensorType,
    view: &SensorViewModel,
    opts: &FormatOptions,
) -> Result<String> {
    #[derive(Serialize)]
    struct Summary<'a> {
        sensor_id: &'a str,
        sensor_type: SensorType,
        unit: &'static str,
        #[serde(flatten)]
        view: &'a SensorViewModel,
    }

    opts.as_json(&Summary {
        sensor_id,
        sensor_type: sensor,
        unit: sensor.unit(),
        view,
    })
}

// ============================================================================
// Classification formatting
// ============================================================================

pub fn format_classification_text(
    value: f64,
    sensor: SensorType,
    status: Status,
    opts: &FormatOptions,
) -> String {
    format!(
        "{} {} {}: {}\n",
        sensor,
        format_value(value, sensor),
        format_status(status, opts.no_color),
        status.description()
    )
}

pub fn format_classification_json(
    value: f64,
    sensor: SensorType,
    status: Status,
    opts: &FormatOptions,
) -> Result<String> {
    #[derive(Serialize)]
    struct Classification {
        sensor_type: SensorType,
        value: f64,
        unit: &'static str,
        status: Status,
        description: &'static str,
        action: &'static str,
    }

    opts.as_json(&Classification {
        sensor_type: sensor,
        value,
        unit: sensor.unit(),
        status,
        description: status.description(),
        action: status.action(),
    })
}

// ============================================================================
// Range table formatting
// ============================================================================

pub fn format_ranges_text(table: &RangeTable) -> String {
    let multipliers = table.multipliers();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>10} {:>10} {:>14} {:>14}",
        "Sensor", "Unit", "Min", "Max", "Critical <", "Critical >"
    );
    for (sensor, range) in table.iter() {
        let _ = writeln!(
            out,
            "{:<14} {:>8} {:>10} {:>10} {:>14} {:>14}",
            sensor.key(),
            sensor.unit(),
            range.min,
            range.max,
            range.min * multipliers.critical_low,
            range.max * multipliers.critical_high
        );
    }
    out
}

pub fn format_ranges_json(table: &RangeTable, opts: &FormatOptions) -> Result<String> {
    opts.as_json(table)
}
