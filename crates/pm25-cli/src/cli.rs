//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Dashboard tuning flags shared by `watch` and `status`.
///
/// Every flag is optional; unset flags fall back to the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct DashboardArgs {
    /// History window in hours (1-720)
    #[arg(long)]
    pub hours: Option<u32>,

    /// Keep every n-th history point in the chart
    #[arg(long)]
    pub stride: Option<usize>,
}

#[derive(Parser)]
#[command(name = "pm25")]
#[command(author, version, about = "Terminal dashboard for a PM2.5 forecasting server", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Server root URL (overrides config)
    #[arg(short, long, global = true, env = "PM25_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(short = 'T', long, global = true)]
    pub timeout: Option<u64>,

    /// Use this config file instead of the default location
    #[arg(long = "config", global = true, env = "PM25_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Live dashboard, refreshed on an interval
    Watch {
        /// Seconds between refreshes (10-3600)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many refreshes (0 = run until Ctrl+C)
        #[arg(short = 'n', long, default_value = "0")]
        count: u64,

        /// Append each refresh instead of redrawing the screen
        #[arg(long)]
        no_clear: bool,

        #[command(flatten)]
        dashboard: DashboardArgs,
    },

    /// Fetch once and print the dashboard
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no pretty-printing)
        #[arg(long, requires = "json")]
        compact: bool,

        #[command(flatten)]
        dashboard: DashboardArgs,
    },

    /// Measured concentrations over a past window
    History {
        /// Window in hours (1-720)
        #[arg(long, default_value = "24")]
        hours: u32,

        /// Keep every n-th point
        #[arg(long, default_value = "1")]
        stride: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Omit header row in CSV output
        #[arg(long)]
        no_header: bool,
    },

    /// The latest forecast
    Forecast {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Omit header row in CSV output
        #[arg(long)]
        no_header: bool,
    },

    /// Server database statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the assistant about the data
    Chat {
        /// Send a single message and exit instead of starting a session
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,

    /// Show the effective configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
