//! Forecast command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use pm25_core::series::average;
use pm25_core::{DashboardApi, Prediction};

use super::{connect, write_output};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{
    FormatOptions, format_forecast_csv, format_forecast_json, format_forecast_text,
};

pub async fn cmd_forecast(
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
    opts: &FormatOptions,
) -> Result<()> {
    let client = connect(config)?;
    let predictions = client
        .predictions()
        .await
        .context("Failed to fetch predictions")?
        .into_iter()
        .map(Prediction::validate)
        .collect::<Result<Vec<_>, _>>()
        .context("Server returned an invalid forecast")?;

    let content = match format {
        OutputFormat::Json => format_forecast_json(&predictions, opts)?,
        OutputFormat::Csv => format_forecast_csv(&predictions, opts),
        OutputFormat::Text => format_forecast_text(&predictions, average(&predictions), opts),
    };
    write_output(output, &content)
}
