//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use serde::Serialize;

use pm25_core::chat::{APOLOGY_MESSAGE, PENDING_TEXT, UNREACHABLE_MESSAGE};
use pm25_core::series::{AxisKind, format_axis_label};
use pm25_core::snapshot::{INITIALIZING_TEXT, PLACEHOLDER};
use pm25_core::{
    ChartRegistry, ChartSlot, ChatMessage, CycleReport, DashboardSnapshot, HistoryPoint,
    MessageStatus, Prediction, Sender, ServerStats, SourceStatus,
};
use pm25_types::format_timestamp;

use crate::render::{TerminalChart, TerminalRenderer};
use crate::style;

const UNIT: &str = "µg/m³";

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            ..Self::default()
        }
    }

    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize to JSON respecting the compact setting.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let mut json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        json.push('\n');
        Ok(json)
    }
}

/// Escape a CSV field if it contains special characters.
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn value_or_placeholder(value: Option<f64>, no_color: bool) -> String {
    match value {
        Some(v) => format!("{} {}", style::format_pm25_colored(v, no_color), UNIT),
        None => PLACEHOLDER.to_string(),
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Render the full dashboard panel.
pub fn format_dashboard(
    snapshot: &DashboardSnapshot,
    charts: &ChartRegistry<TerminalRenderer>,
    opts: &FormatOptions,
) -> String {
    let nc = opts.no_color;
    let mut out = String::new();

    let updated = snapshot
        .last_updated
        .map(format_timestamp)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    out.push_str(&format!(
        "{}  {}\n",
        style::heading("PM2.5 Dashboard", nc),
        style::dim(&format!("updated {} | cycle {}", updated, snapshot.cycles), nc)
    ));
    out.push_str(&format!("{}\n", "-".repeat(50)));

    match (snapshot.current, snapshot.category) {
        (Some(reading), Some(category)) => {
            out.push_str(&format!(
                "Current:    {} {}  {}\n",
                style::format_pm25_colored(reading.pm25, nc),
                UNIT,
                style::format_category(category, nc)
            ));
            out.push_str(&format!("Advisory:   {}\n", category.advisory()));
        }
        _ => {
            out.push_str(&format!("Current:    {}\n", style::dim(INITIALIZING_TEXT, nc)));
        }
    }

    let next = value_or_placeholder(snapshot.next_hour(), nc);
    match snapshot.trend {
        Some(trend) => out.push_str(&format!(
            "Next hour:  {}  {} ({})\n",
            next,
            style::format_trend(&trend, nc),
            style::direction_word(trend.direction)
        )),
        None => out.push_str(&format!("Next hour:  {}\n", next)),
    }
    out.push_str(&format!(
        "24h avg:    {}\n",
        value_or_placeholder(snapshot.average_24h, nc)
    ));
    out.push_str(&format!(
        "Advice:     {}\n",
        snapshot.server_advice.as_deref().unwrap_or(PLACEHOLDER)
    ));

    out.push('\n');
    out.push_str(&format_chart("Forecast", charts.get(ChartSlot::Forecast), nc));
    out.push_str(&format_chart("History", charts.get(ChartSlot::History), nc));
    out
}

fn format_chart(title: &str, chart: Option<&TerminalChart>, no_color: bool) -> String {
    match chart {
        Some(chart) => format!(
            "{:<10}  {}\n{:<10}  {} .. {}  ({} points, {:.1}-{:.1} {})\n",
            title,
            chart.line,
            "",
            style::dim(&chart.first_label, no_color),
            style::dim(&chart.last_label, no_color),
            chart.points,
            chart.min,
            chart.max,
            UNIT
        ),
        None => format!("{:<10}  {}\n", title, PLACEHOLDER),
    }
}

/// One line per failed source, for display under the dashboard.
pub fn format_cycle_failures(report: &CycleReport, opts: &FormatOptions) -> String {
    let sources = [
        ("current", &report.current),
        ("predictions", &report.predictions),
        ("history", &report.history),
        ("advice", &report.advice),
    ];

    sources
        .iter()
        .filter_map(|(name, status)| match status {
            SourceStatus::Failed(reason) => Some(format!(
                "{}\n",
                style::warning(&format!("! {} unavailable: {}", name, reason), opts.no_color)
            )),
            _ => None,
        })
        .collect()
}

// ============================================================================
// History and forecast
// ============================================================================

#[derive(Serialize)]
struct SeriesRow<'a> {
    datetime: String,
    label: String,
    pm25: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sitename: Option<&'a str>,
}

fn history_rows(points: &[HistoryPoint]) -> Vec<SeriesRow<'_>> {
    points
        .iter()
        .map(|p| SeriesRow {
            datetime: format_timestamp(p.timestamp),
            label: format_axis_label(p.timestamp, AxisKind::History),
            pm25: p.pm25,
            sitename: p.sitename.as_deref(),
        })
        .collect()
}

fn forecast_rows(predictions: &[Prediction]) -> Vec<SeriesRow<'static>> {
    predictions
        .iter()
        .map(|p| SeriesRow {
            datetime: format_timestamp(p.target),
            label: format_axis_label(p.target, AxisKind::Forecast),
            pm25: p.predicted_pm25,
            sitename: None,
        })
        .collect()
}

fn format_rows_text(rows: &[SeriesRow<'_>], header: &str, opts: &FormatOptions) -> String {
    if rows.is_empty() {
        return "No data.\n".to_string();
    }
    let mut out = format!("{}\n", style::heading(header, opts.no_color));
    for row in rows {
        out.push_str(&format!(
            "{:<18}{:>8} {}  {}\n",
            row.datetime,
            style::format_pm25_colored(row.pm25, opts.no_color),
            UNIT,
            style::dim(row.sitename.unwrap_or(""), opts.no_color)
        ));
    }
    out
}

fn format_rows_csv(rows: &[SeriesRow<'_>], opts: &FormatOptions) -> String {
    let mut out = String::new();
    if !opts.no_header {
        out.push_str("datetime,pm25,sitename\n");
    }
    for row in rows {
        out.push_str(&format!(
            "{},{:.1},{}\n",
            row.datetime,
            row.pm25,
            csv_escape(row.sitename.unwrap_or(""))
        ));
    }
    out
}

pub fn format_history_text(points: &[HistoryPoint], opts: &FormatOptions) -> String {
    format_rows_text(&history_rows(points), "Measured PM2.5", opts)
}

pub fn format_history_csv(points: &[HistoryPoint], opts: &FormatOptions) -> String {
    format_rows_csv(&history_rows(points), opts)
}

pub fn format_history_json(points: &[HistoryPoint], opts: &FormatOptions) -> Result<String> {
    opts.as_json(&history_rows(points))
}

pub fn format_forecast_text(
    predictions: &[Prediction],
    average: Option<f64>,
    opts: &FormatOptions,
) -> String {
    let mut out = format_rows_text(&forecast_rows(predictions), "Predicted PM2.5", opts);
    if let Some(avg) = average {
        out.push_str(&format!(
            "\nAverage:          {} {}\n",
            style::format_pm25_colored(avg, opts.no_color),
            UNIT
        ));
    }
    out
}

pub fn format_forecast_csv(predictions: &[Prediction], opts: &FormatOptions) -> String {
    format_rows_csv(&forecast_rows(predictions), opts)
}

pub fn format_forecast_json(predictions: &[Prediction], opts: &FormatOptions) -> Result<String> {
    opts.as_json(&forecast_rows(predictions))
}

// ============================================================================
// Stats and chat
// ============================================================================

pub fn format_stats_text(stats: &ServerStats, opts: &FormatOptions) -> String {
    let latest = stats
        .latest_datetime
        .map(format_timestamp)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!(
        "{}\nMeasurements:  {}\nLatest:        {}\nPredictions:   {}\n",
        style::heading("Server statistics", opts.no_color),
        stats.total_measurements,
        latest,
        stats.prediction_count
    )
}

/// Replies the session substitutes when the exchange failed.
const FALLBACK_REPLIES: [&str; 2] = [APOLOGY_MESSAGE, UNREACHABLE_MESSAGE];

/// Format one transcript entry.
pub fn format_chat_message(message: &ChatMessage, opts: &FormatOptions) -> String {
    let nc = opts.no_color;
    let speaker = style::heading(&format!("{}:", message.sender), nc);
    let text = match (message.sender, message.status) {
        (_, MessageStatus::Pending) => style::dim(PENDING_TEXT, nc),
        (Sender::Bot, MessageStatus::Error) => style::warning(&message.text, nc),
        (Sender::Bot, _) if FALLBACK_REPLIES.contains(&message.text.as_str()) => {
            style::warning(&message.text, nc)
        }
        _ => message.text.clone(),
    };
    format!("{} {}\n", speaker, text)
}
