//! Terminal client for a PM2.5 forecasting server.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `watch` | Live dashboard, refreshed on an interval |
//! | `status` | Fetch once and print the dashboard |
//! | `history` | Measured concentrations over a past window |
//! | `forecast` | The latest forecast |
//! | `stats` | Server database statistics |
//! | `chat` | Ask the assistant about the data |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI reads `~/.config/pm25/config.toml` (or platform equivalent):
//!
//! - `server_url`: server root, default `http://localhost:5000`
//! - `timeout`: request timeout in seconds
//! - `no_color`: disable colored output
//! - `[dashboard]`: `refresh_interval`, `history_hours`, `history_stride`
//! - `[chat]`: `enabled`
//!
//! # Environment Variables
//!
//! - `PM25_URL`: server root (overridden by `--url`)
//! - `PM25_CONFIG`: config file path (overridden by `--config`)
//! - `NO_COLOR`: disable colored output when set
//!
//! # Examples
//!
//! ```bash
//! pm25 watch --interval 60
//! pm25 status --json --url http://pm25.local:5000
//! pm25 history --hours 72 --format csv --output week.csv
//! pm25 chat --message "What was the average last week?"
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod render;
pub mod style;

// Re-export core dependencies for convenience
pub use pm25_core;
pub use pm25_types;
