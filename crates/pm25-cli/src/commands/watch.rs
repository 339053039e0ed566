//! Watch command implementation.
//!
//! Drives the sync engine on its refresh interval and redraws the dashboard
//! after every cycle. Ctrl+C stops the engine between cycles.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use pm25_core::SyncEngine;

use super::{connect, write_output};
use crate::config::Config;
use crate::format::{FormatOptions, format_cycle_failures, format_dashboard};
use crate::render::{TerminalRenderer, chart_width};

/// Clear screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    /// Stop after this many cycles (0 = until Ctrl+C).
    pub count: u64,
    pub no_clear: bool,
    pub output: Option<&'a Path>,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch(config: &Config, args: WatchArgs<'_>) -> Result<()> {
    let WatchArgs {
        count,
        no_clear,
        output,
        opts,
    } = args;

    let client = connect(config)?;
    if !client.is_reachable().await {
        warn!(
            "Server at {} is not answering; the dashboard will keep retrying",
            client.base_url()
        );
    }

    let header = if opts.no_color {
        format!("Watching: {}", config.server_url)
    } else {
        format!("Watching: {}", config.server_url.cyan())
    };
    eprintln!("{}", header);
    eprintln!(
        "Interval: {}s | History: {}h | Press Ctrl+C to stop",
        config.dashboard.refresh_interval, config.dashboard.history_hours
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nShutting down...");
            on_signal.cancel();
        }
    });

    let redraw = output.is_none() && !no_clear && io::stdout().is_terminal();
    let stop = cancel.clone();
    let mut write_error = None;

    let mut engine = SyncEngine::new(
        client,
        TerminalRenderer::new(chart_width()),
        config.sync_config(),
    );
    engine
        .run(cancel, |report, snapshot, charts| {
            let mut content = String::new();
            if redraw {
                content.push_str(CLEAR_SCREEN);
            }
            content.push_str(&format_dashboard(snapshot, charts, opts));
            content.push_str(&format_cycle_failures(report, opts));
            if !redraw {
                content.push('\n');
            }

            if let Err(e) = write_output(output, &content) {
                write_error = Some(e);
                stop.cancel();
            } else if count > 0 && report.cycle >= count {
                stop.cancel();
            }
        })
        .await;

    match write_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
