use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use pm25_cli::cli::{Cli, Commands, DashboardArgs};
use pm25_cli::commands::{
    HistoryArgs, WatchArgs, cmd_chat, cmd_config, cmd_forecast, cmd_history, cmd_stats,
    cmd_status, cmd_watch,
};
use pm25_cli::config::{Config, Overrides};
use pm25_cli::format::FormatOptions;

/// Collect the command-line values that override the config file.
fn overrides(cli: &Cli) -> Overrides {
    let (refresh_interval, dashboard) = match &cli.command {
        Commands::Watch {
            interval,
            dashboard,
            ..
        } => (*interval, dashboard.clone()),
        Commands::Status { dashboard, .. } => (None, dashboard.clone()),
        _ => (None, DashboardArgs::default()),
    };

    Overrides {
        server_url: cli.url.clone(),
        timeout: cli.timeout,
        no_color: cli.no_color,
        refresh_interval,
        history_hours: dashboard.hours,
        history_stride: dashboard.stride,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "pm25", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout carries the dashboard, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config_file.clone().unwrap_or_else(Config::default_path);
    let overrides = overrides(&cli);

    if let Commands::Config { action } = cli.command {
        return cmd_config(action, &config_path, overrides);
    }

    let config = Config::load_or_default(&config_path)?.with_overrides(overrides);
    config.validate()?;
    tracing::debug!("Using server {}", config.server_url);

    let opts = FormatOptions::new(config.no_color);
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Watch {
            count, no_clear, ..
        } => {
            cmd_watch(
                &config,
                WatchArgs {
                    count,
                    no_clear,
                    output,
                    opts: &opts,
                },
            )
            .await
        }
        Commands::Status { json, compact, .. } => {
            cmd_status(&config, json, output, &opts.with_compact(compact)).await
        }
        Commands::History {
            hours,
            stride,
            format,
            no_header,
        } => {
            cmd_history(
                &config,
                HistoryArgs {
                    hours,
                    stride,
                    format,
                    output,
                    opts: &opts.with_no_header(no_header),
                },
            )
            .await
        }
        Commands::Forecast { format, no_header } => {
            cmd_forecast(&config, format, output, &opts.with_no_header(no_header)).await
        }
        Commands::Stats { json } => cmd_stats(&config, json, output, &opts).await,
        Commands::Chat { message } => cmd_chat(&config, message.as_deref(), &opts).await,
        Commands::Config { .. } | Commands::Completions { .. } => {
            // Already handled above
            Ok(())
        }
    }
}
