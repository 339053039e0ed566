//! Trait abstraction for the prediction server.
//!
//! [`DashboardApi`] abstracts over the real HTTP client and the mock used
//! in tests, so the sync engine and the chat session can be exercised
//! without a server.

use std::sync::Arc;

use async_trait::async_trait;

use pm25_types::{CurrentConditions, HistoryPoint, Prediction, ServerStats};

use crate::error::Result;

/// Request/response operations the dashboard consumes.
///
/// # Example
///
/// ```ignore
/// use pm25_core::{DashboardApi, Result};
///
/// async fn print_current<A: DashboardApi>(api: &A) -> Result<()> {
///     let current = api.current().await?;
///     println!("PM2.5: {} µg/m³", current.current_pm25);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Latest measurement and the next-hour prediction.
    async fn current(&self) -> Result<CurrentConditions>;

    /// Latest forecast, ordered by target hour.
    async fn predictions(&self) -> Result<Vec<Prediction>>;

    /// The last `hours` hours of measurements, oldest first.
    async fn history(&self, hours: u32) -> Result<Vec<HistoryPoint>>;

    /// Free-text health advice.
    async fn advice(&self) -> Result<String>;

    /// Ask the assistant a question.
    async fn chat(&self, message: &str) -> Result<String>;

    /// Database statistics.
    async fn stats(&self) -> Result<ServerStats>;
}

#[async_trait]
impl<T: DashboardApi + ?Sized> DashboardApi for Arc<T> {
    async fn current(&self) -> Result<CurrentConditions> {
        (**self).current().await
    }

    async fn predictions(&self) -> Result<Vec<Prediction>> {
        (**self).predictions().await
    }

    async fn history(&self, hours: u32) -> Result<Vec<HistoryPoint>> {
        (**self).history(hours).await
    }

    async fn advice(&self) -> Result<String> {
        (**self).advice().await
    }

    async fn chat(&self, message: &str) -> Result<String> {
        (**self).chat(message).await
    }

    async fn stats(&self) -> Result<ServerStats> {
        (**self).stats().await
    }
}
