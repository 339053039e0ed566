//! Command implementations for the CLI.

mod chat;
mod config;
mod forecast;
mod history;
mod stats;
mod status;
mod watch;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use pm25_core::ServiceClient;

use crate::config::Config;

pub use chat::cmd_chat;
pub use config::cmd_config;
pub use forecast::cmd_forecast;
pub use history::{HistoryArgs, cmd_history};
pub use stats::cmd_stats;
pub use status::cmd_status;
pub use watch::{WatchArgs, cmd_watch};

/// Build an HTTP client from the effective configuration.
pub fn connect(config: &Config) -> Result<ServiceClient> {
    ServiceClient::with_timeout(&config.server_url, config.request_timeout())
        .with_context(|| format!("Invalid server URL '{}'", config.server_url))
}

/// Write to a file if given, else to stdout.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
