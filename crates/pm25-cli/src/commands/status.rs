//! Status command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use serde::Serialize;

use pm25_core::snapshot::Phase;
use pm25_core::{DashboardSnapshot, SourceStatus, SyncEngine};

use super::{connect, write_output};
use crate::config::Config;
use crate::format::{FormatOptions, format_cycle_failures, format_dashboard};
use crate::render::{TerminalRenderer, chart_width};

#[derive(Serialize)]
struct StatusJson<'a> {
    phase: Phase,
    advisory: Option<&'static str>,
    #[serde(flatten)]
    snapshot: &'a DashboardSnapshot,
}

/// Run a single sync cycle and print the result.
pub async fn cmd_status(
    config: &Config,
    json: bool,
    output: Option<&Path>,
    opts: &FormatOptions,
) -> Result<()> {
    let client = connect(config)?;
    let mut engine = SyncEngine::new(
        client,
        TerminalRenderer::new(chart_width()),
        config.sync_config(),
    );

    let report = engine.run_cycle().await;
    if report.failures() == 4 {
        let reason = match &report.current {
            SourceStatus::Failed(reason) => reason.as_str(),
            _ => "no response",
        };
        bail!("No data from {}: {}", config.server_url, reason);
    }

    let snapshot = engine.snapshot();
    let content = if json {
        opts.as_json(&StatusJson {
            phase: snapshot.phase(),
            advisory: snapshot.advisory(),
            snapshot,
        })?
    } else {
        let mut out = format_dashboard(snapshot, engine.charts(), opts);
        out.push_str(&format_cycle_failures(&report, opts));
        out
    };

    write_output(output, &content)
}
