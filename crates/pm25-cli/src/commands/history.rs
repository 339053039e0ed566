//! History command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use pm25_core::series::downsample;
use pm25_core::{DashboardApi, HistoryPoint};

use super::{connect, write_output};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{
    FormatOptions, format_history_csv, format_history_json, format_history_text,
};

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub hours: u32,
    pub stride: usize,
    pub format: OutputFormat,
    pub output: Option<&'a Path>,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_history(config: &Config, args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        hours,
        stride,
        format,
        output,
        opts,
    } = args;

    let client = connect(config)?;
    let history = client
        .history(hours)
        .await
        .with_context(|| format!("Failed to fetch {} hours of history", hours))?;

    let mut points = history
        .into_iter()
        .map(HistoryPoint::validate)
        .collect::<Result<Vec<_>, _>>()
        .context("Server returned invalid history")?;
    points.sort_by_key(|p| p.timestamp);
    let points = downsample(&points, stride);

    let content = match format {
        OutputFormat::Json => format_history_json(&points, opts)?,
        OutputFormat::Csv => format_history_csv(&points, opts),
        OutputFormat::Text => format_history_text(&points, opts),
    };
    write_output(output, &content)
}
