//! Shared types for the PM2.5 dashboard.
//!
//! This crate holds the data model used by the sync engine and the chat
//! session (pm25-core) and by the terminal client (pm25-cli): measured
//! readings, forecasts, history points, chat messages, and the JSON bodies
//! exchanged with the prediction server.
//!
//! # Example
//!
//! ```
//! use pm25_types::{CurrentConditions, parse_timestamp};
//!
//! let body = r#"{"datetime": "2025-11-23 14:00", "current_pm25": 15.3}"#;
//! let current: CurrentConditions = serde_json::from_str(body).unwrap();
//! assert_eq!(current.timestamp, parse_timestamp("2025-11-23 14:00").unwrap());
//! ```

pub mod datetime;
pub mod error;
pub mod types;

pub use datetime::{format_timestamp, parse_timestamp, serde_timestamp};
pub use error::{ParseError, ParseResult};
pub use types::{
    AdviceResponse, ChatMessage, ChatReply, ChatRequest, CurrentConditions, HistoryPoint,
    HistoryResponse, MessageStatus, Prediction, PredictionsResponse, Reading, Sender, ServerStats,
};
