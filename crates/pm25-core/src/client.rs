//! HTTP client for the PM2.5 prediction server.
//!
//! # Example
//!
//! ```no_run
//! use pm25_core::client::ServiceClient;
//! use pm25_core::DashboardApi;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ServiceClient::new("http://localhost:5000")?;
//!
//! let current = client.current().await?;
//! println!("PM2.5: {} at {}", current.current_pm25, current.timestamp);
//!
//! let reply = client.chat("What was the average last week?").await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use pm25_types::{
    AdviceResponse, ChatReply, ChatRequest, CurrentConditions, HistoryPoint, HistoryResponse,
    Prediction, PredictionsResponse, ServerStats,
};

use crate::error::{ApiError, Result};
use crate::traits::DashboardApi;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest history window the server will return (30 days).
pub const MAX_HISTORY_HOURS: u32 = 720;

/// Default history window (7 days).
pub const DEFAULT_HISTORY_HOURS: u32 = 168;

/// HTTP client for the prediction server API.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ApiError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Ok(base_url)
}

impl ServiceClient {
    /// Create a new client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The server root (e.g., "http://localhost:5000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is reachable and answering.
    pub async fn is_reachable(&self) -> bool {
        self.stats().await.is_ok()
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
                duration: self.timeout,
            }
        } else {
            ApiError::Unreachable {
                url: url.to_string(),
                source: Box::new(e),
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        self.handle_response(&url, response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        self.handle_response(&url, response).await
    }

    /// Decode a response body.
    ///
    /// Non-2xx statuses and 2xx bodies carrying an `error` field both become
    /// [`ApiError::Api`] with the server's message.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let value = serde_json::from_slice::<serde_json::Value>(&body);
        let server_error = value
            .as_ref()
            .ok()
            .and_then(|v| v.get("error"))
            .and_then(|e| e.as_str())
            .map(String::from);

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: server_error.unwrap_or_else(|| status.to_string()),
            });
        }
        if let Some(message) = server_error {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value = value.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DashboardApi for ServiceClient {
    async fn current(&self) -> Result<CurrentConditions> {
        self.get("/api/current").await
    }

    async fn predictions(&self) -> Result<Vec<Prediction>> {
        let body: PredictionsResponse = self.get("/api/predictions").await?;
        Ok(body.predictions)
    }

    async fn history(&self, hours: u32) -> Result<Vec<HistoryPoint>> {
        let hours = hours.clamp(1, MAX_HISTORY_HOURS);
        let body: HistoryResponse = self.get(&format!("/api/history?hours={}", hours)).await?;
        Ok(body.history)
    }

    async fn advice(&self) -> Result<String> {
        let body: AdviceResponse = self.get("/api/status").await?;
        Ok(body.status)
    }

    async fn chat(&self, message: &str) -> Result<String> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        let body: ChatReply = self.post_json("/api/chat", &request).await?;
        Ok(body.response)
    }

    async fn stats(&self) -> Result<ServerStats> {
        self.get("/api/stats").await
    }
}
