//! Mock server implementation for testing.
//!
//! [`MockApi`] implements [`DashboardApi`] from in-memory data so the sync
//! engine and chat session can be tested without a running server.
//!
//! # Features
//!
//! - **Failure injection**: make any endpoint fail with a transport error,
//!   an application error payload, or a malformed body
//! - **Latency simulation**: delay individual endpoints to control the order
//!   in which concurrent sub-fetches complete
//! - **Call accounting**: count calls per endpoint, remember request arguments

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::PrimitiveDateTime;
use time::macros::datetime;
use tokio::sync::RwLock;

use pm25_types::{CurrentConditions, HistoryPoint, Prediction, ServerStats};

use crate::error::{ApiError, Result};
use crate::traits::DashboardApi;

/// One of the server endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Predictions,
    History,
    Advice,
    Chat,
    Stats,
}

impl Endpoint {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        self as usize
    }

    fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "/api/current",
            Endpoint::Predictions => "/api/predictions",
            Endpoint::History => "/api/history",
            Endpoint::Advice => "/api/status",
            Endpoint::Chat => "/api/chat",
            Endpoint::Stats => "/api/stats",
        }
    }
}

/// How an injected failure presents itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// No response (connection refused).
    Transport,
    /// Request timed out.
    Timeout,
    /// Error payload with the given HTTP status and message.
    Api { status: u16, message: String },
    /// Body that does not decode.
    Malformed,
}

impl MockFailure {
    fn into_error(self, endpoint: Endpoint) -> ApiError {
        let url = format!("mock://{}", endpoint.path());
        match self {
            MockFailure::Transport => ApiError::unreachable(url, "connection refused"),
            MockFailure::Timeout => ApiError::Timeout {
                url,
                duration: Duration::from_secs(10),
            },
            MockFailure::Api { status, message } => ApiError::Api { status, message },
            MockFailure::Malformed => ApiError::Decode {
                url,
                message: "expected value at line 1 column 1".to_string(),
            },
        }
    }
}

/// A mock prediction server for testing.
///
/// # Example
///
/// ```
/// use pm25_core::{DashboardApi, MockApi};
/// use pm25_core::mock::{Endpoint, MockFailure};
///
/// #[tokio::main]
/// async fn main() {
///     let api = MockApi::new();
///     assert!(api.current().await.is_ok());
///
///     api.fail(Endpoint::Current, MockFailure::Transport).await;
///     assert!(api.current().await.unwrap_err().is_transport());
/// }
/// ```
pub struct MockApi {
    current: RwLock<CurrentConditions>,
    predictions: RwLock<Vec<Prediction>>,
    history: RwLock<Vec<HistoryPoint>>,
    advice: RwLock<String>,
    chat_reply: RwLock<String>,
    stats: RwLock<ServerStats>,
    failures: RwLock<[Option<MockFailure>; Endpoint::COUNT]>,
    /// Simulated latency per endpoint in milliseconds (0 = no delay).
    latency_ms: [AtomicU64; Endpoint::COUNT],
    calls: [AtomicU32; Endpoint::COUNT],
    last_history_hours: AtomicU32,
    last_chat_message: RwLock<Option<String>>,
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi")
            .field("current_calls", &self.call_count(Endpoint::Current))
            .field("chat_calls", &self.call_count(Endpoint::Chat))
            .finish()
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Timestamp of the default mock reading.
pub const MOCK_NOW: PrimitiveDateTime = datetime!(2025-11-23 14:00);

impl MockApi {
    /// Create a mock with a Good reading, a 24-hour forecast and a week of
    /// history.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(CurrentConditions {
                timestamp: MOCK_NOW,
                current_pm25: 12.0,
                next_hour_prediction: Some(13.0),
                server_status: Some("Good".to_string()),
            }),
            predictions: RwLock::new(Self::default_predictions()),
            history: RwLock::new(Self::default_history()),
            advice: RwLock::new("Air quality is good. No precautions needed.".to_string()),
            chat_reply: RwLock::new("The average PM2.5 last week was 14.2 µg/m³.".to_string()),
            stats: RwLock::new(ServerStats {
                total_measurements: 720,
                latest_datetime: Some(MOCK_NOW),
                prediction_count: 24,
            }),
            failures: RwLock::new(Default::default()),
            latency_ms: Default::default(),
            calls: Default::default(),
            last_history_hours: AtomicU32::new(0),
            last_chat_message: RwLock::new(None),
        }
    }

    fn default_predictions() -> Vec<Prediction> {
        (1..=24)
            .map(|h| Prediction {
                target: MOCK_NOW + time::Duration::hours(h),
                predicted_pm25: 12.0 + h as f64 * 0.5,
            })
            .collect()
    }

    fn default_history() -> Vec<HistoryPoint> {
        (0..168)
            .map(|h| HistoryPoint {
                timestamp: MOCK_NOW - time::Duration::hours(167 - h),
                pm25: 10.0 + (h % 24) as f64,
                sitename: Some("Mock Site".to_string()),
            })
            .collect()
    }

    /// Set the reading returned by the current endpoint.
    pub async fn set_current(&self, current: CurrentConditions) {
        *self.current.write().await = current;
    }

    /// Set just the current concentration and its timestamp.
    pub async fn set_reading(&self, timestamp: PrimitiveDateTime, pm25: f64) {
        let mut current = self.current.write().await;
        current.timestamp = timestamp;
        current.current_pm25 = pm25;
    }

    pub async fn set_predictions(&self, predictions: Vec<Prediction>) {
        *self.predictions.write().await = predictions;
    }

    pub async fn set_history(&self, history: Vec<HistoryPoint>) {
        *self.history.write().await = history;
    }

    pub async fn set_advice(&self, advice: &str) {
        *self.advice.write().await = advice.to_string();
    }

    pub async fn set_chat_reply(&self, reply: &str) {
        *self.chat_reply.write().await = reply.to_string();
    }

    /// Make an endpoint fail until [`recover`](Self::recover) is called.
    pub async fn fail(&self, endpoint: Endpoint, failure: MockFailure) {
        self.failures.write().await[endpoint.index()] = Some(failure);
    }

    /// Clear an injected failure.
    pub async fn recover(&self, endpoint: Endpoint) {
        self.failures.write().await[endpoint.index()] = None;
    }

    /// Delay responses from an endpoint.
    pub fn set_latency(&self, endpoint: Endpoint, latency: Duration) {
        self.latency_ms[endpoint.index()].store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of calls made to an endpoint.
    pub fn call_count(&self, endpoint: Endpoint) -> u32 {
        self.calls[endpoint.index()].load(Ordering::Relaxed)
    }

    /// The `hours` argument of the latest history request.
    pub fn last_history_hours(&self) -> u32 {
        self.last_history_hours.load(Ordering::Relaxed)
    }

    /// The latest message sent to the chat endpoint.
    pub async fn last_chat_message(&self) -> Option<String> {
        self.last_chat_message.read().await.clone()
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<()> {
        self.calls[endpoint.index()].fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms[endpoint.index()].load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        match self.failures.read().await[endpoint.index()].clone() {
            Some(failure) => Err(failure.into_error(endpoint)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn current(&self) -> Result<CurrentConditions> {
        self.enter(Endpoint::Current).await?;
        Ok(self.current.read().await.clone())
    }

    async fn predictions(&self) -> Result<Vec<Prediction>> {
        self.enter(Endpoint::Predictions).await?;
        Ok(self.predictions.read().await.clone())
    }

    async fn history(&self, hours: u32) -> Result<Vec<HistoryPoint>> {
        self.last_history_hours.store(hours, Ordering::Relaxed);
        self.enter(Endpoint::History).await?;
        let history = self.history.read().await;
        let skip = history.len().saturating_sub(hours as usize);
        Ok(history[skip..].to_vec())
    }

    async fn advice(&self) -> Result<String> {
        self.enter(Endpoint::Advice).await?;
        Ok(self.advice.read().await.clone())
    }

    async fn chat(&self, message: &str) -> Result<String> {
        *self.last_chat_message.write().await = Some(message.to_string());
        self.enter(Endpoint::Chat).await?;
        Ok(self.chat_reply.read().await.clone())
    }

    async fn stats(&self) -> Result<ServerStats> {
        self.enter(Endpoint::Stats).await?;
        Ok(self.stats.read().await.clone())
    }
}
