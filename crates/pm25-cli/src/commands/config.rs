//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::ConfigAction;
use crate::config::{Config, Overrides};

/// `show` prints the file at `path` merged with command-line overrides.
pub fn cmd_config(action: ConfigAction, path: &Path, overrides: Overrides) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let effective = Config::load_or_default(path)?.with_overrides(overrides);
            let content =
                toml::to_string_pretty(&effective).context("Failed to serialize config")?;
            print!("{}", content);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(path)?;
            eprintln!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
