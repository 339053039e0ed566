//! Dashboard engine for a PM2.5 forecasting server.
//!
//! This crate keeps a local view of a remote prediction server up to date
//! and derives everything a dashboard shows from it: the current category
//! and advisory, the next-hour trend, the 24-hour forecast average and the
//! chart-ready forecast and history series. It also carries the chat
//! session used to ask the server's assistant questions.
//!
//! # Features
//!
//! - **Classification**: map a concentration to an [`AqiCategory`] with its
//!   fixed advisory text
//! - **Derivations**: trend, forecast average, history downsampling and axis
//!   labels in [`series`]
//! - **Chart lifecycle**: at most one live chart per slot via
//!   [`ChartRegistry`]
//! - **Sync engine**: concurrent, failure-isolated refresh cycles on a fixed
//!   interval via [`SyncEngine`]
//! - **Chat**: optimistic send with a single exchange in flight via
//!   [`ChatSession`]
//! - **HTTP client**: [`client::ServiceClient`] (feature `service-client`)
//! - **Mock server**: [`MockApi`] for tests and offline demos
//!
//! # Quick Start
//!
//! ```
//! use pm25_core::{AqiCategory, Thresholds};
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.evaluate(12.0), AqiCategory::Good);
//! assert_eq!(thresholds.evaluate(40.0), AqiCategory::UnhealthyForSensitiveGroups);
//! ```
//!
//! Running one sync cycle against the mock server:
//!
//! ```
//! use pm25_core::charts::RetainedRenderer;
//! use pm25_core::{MockApi, SyncConfig, SyncEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut engine = SyncEngine::new(
//!         MockApi::new(),
//!         RetainedRenderer::default(),
//!         SyncConfig::default(),
//!     );
//!     let report = engine.run_cycle().await;
//!     assert_eq!(report.failures(), 0);
//!     assert!(!engine.snapshot().is_initializing());
//! }
//! ```

pub mod charts;
pub mod chat;
#[cfg(feature = "service-client")]
pub mod client;
pub mod error;
pub mod mock;
pub mod series;
pub mod snapshot;
pub mod sync;
pub mod thresholds;
pub mod traits;

pub use charts::{ChartData, ChartRegistry, ChartRenderer, ChartSlot};
pub use chat::{ChatSession, ChatState, PendingExchange};
#[cfg(feature = "service-client")]
pub use client::ServiceClient;
pub use error::{ApiError, Result};
pub use mock::MockApi;
pub use series::{AxisKind, Direction, Tone, Trend};
pub use snapshot::{DashboardSnapshot, Phase};
pub use sync::{CycleReport, Source, SourceStatus, SyncConfig, SyncEngine};
pub use thresholds::{AqiCategory, ThresholdConfig, Thresholds, classify};
pub use traits::DashboardApi;

// Re-export the data model so downstream crates need a single dependency.
pub use pm25_types;
pub use pm25_types::{
    ChatMessage, CurrentConditions, HistoryPoint, MessageStatus, Prediction, Reading, Sender,
    ServerStats,
};
