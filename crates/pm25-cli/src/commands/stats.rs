//! Stats command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use pm25_core::DashboardApi;

use super::{connect, write_output};
use crate::config::Config;
use crate::format::{FormatOptions, format_stats_text};

pub async fn cmd_stats(
    config: &Config,
    json: bool,
    output: Option<&Path>,
    opts: &FormatOptions,
) -> Result<()> {
    let client = connect(config)?;
    let stats = client
        .stats()
        .await
        .with_context(|| format!("Failed to fetch statistics from {}", config.server_url))?;

    let content = if json {
        opts.as_json(&stats)?
    } else {
        format_stats_text(&stats, opts)
    };
    write_output(output, &content)
}
