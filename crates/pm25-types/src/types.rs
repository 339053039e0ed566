//! Core types for PM2.5 dashboard data.

use core::fmt;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::datetime::serde_timestamp;
use crate::error::{ParseError, ParseResult};

/// Reject NaN and infinities; clamp negative concentrations to zero.
fn sanitize_pm25(field: &'static str, value: f64) -> ParseResult<f64> {
    if !value.is_finite() {
        return Err(ParseError::NonFinite { field, value });
    }
    Ok(value.max(0.0))
}

/// A single measured PM2.5 concentration in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the measurement was taken (station-local time).
    #[serde(with = "serde_timestamp")]
    pub timestamp: PrimitiveDateTime,
    /// PM2.5 concentration, always finite and non-negative.
    pub pm25: f64,
}

impl Reading {
    /// Create a validated reading.
    ///
    /// Non-finite values are rejected. Negative values, which some sensors
    /// report after calibration drift, are clamped to zero.
    pub fn new(timestamp: PrimitiveDateTime, pm25: f64) -> ParseResult<Self> {
        Ok(Self {
            timestamp,
            pm25: sanitize_pm25("current_pm25", pm25)?,
        })
    }
}

/// A model forecast for one future hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The hour this prediction is for.
    #[serde(rename = "target_datetime", with = "serde_timestamp")]
    pub target: PrimitiveDateTime,
    /// Predicted PM2.5 concentration.
    pub predicted_pm25: f64,
}

impl Prediction {
    pub fn validate(self) -> ParseResult<Self> {
        Ok(Self {
            predicted_pm25: sanitize_pm25("predicted_pm25", self.predicted_pm25)?,
            ..self
        })
    }
}

/// A stored hourly measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    #[serde(rename = "datetime", with = "serde_timestamp")]
    pub timestamp: PrimitiveDateTime,
    pub pm25: f64,
    /// Monitoring site name, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitename: Option<String>,
}

impl HistoryPoint {
    pub fn validate(self) -> ParseResult<Self> {
        Ok(Self {
            pm25: sanitize_pm25("pm25", self.pm25)?,
            ..self
        })
    }
}

/// Body of the current-reading endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "datetime", with = "serde_timestamp")]
    pub timestamp: PrimitiveDateTime,
    pub current_pm25: f64,
    /// First hour of the latest forecast, if the server has one.
    #[serde(default)]
    pub next_hour_prediction: Option<f64>,
    /// Category label computed by the server. Informational only: the
    /// server's thresholds differ from the client's and may disagree.
    #[serde(default, rename = "status")]
    pub server_status: Option<String>,
}

impl CurrentConditions {
    /// Extract the validated reading.
    pub fn reading(&self) -> ParseResult<Reading> {
        Reading::new(self.timestamp, self.current_pm25)
    }

    /// Validated next-hour prediction, if present.
    pub fn next_hour(&self) -> ParseResult<Option<f64>> {
        self.next_hour_prediction
            .map(|v| sanitize_pm25("next_hour_prediction", v))
            .transpose()
    }
}

/// Body of the predictions endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionsResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// Body of the history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
}

/// Body of the status/advice endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub status: String,
}

/// Body of the stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub total_measurements: u64,
    #[serde(default, with = "serde_timestamp::option")]
    pub latest_datetime: Option<PrimitiveDateTime>,
    pub prediction_count: u64,
}

/// Request body for the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Successful chat endpoint reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "You"),
            Sender::Bot => write!(f, "Assistant"),
        }
    }
}

/// Delivery state of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Settled content.
    Final,
    /// Placeholder shown while a reply is outstanding.
    Pending,
    /// The exchange failed; the text is a user-facing explanation.
    Error,
}

/// One entry in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: uuid::Uuid,
    pub sender: Sender,
    pub text: String,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            sender,
            text: text.into(),
            status,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_reading_rejects_non_finite() {
        let ts = datetime!(2025-11-23 14:00);
        assert!(Reading::new(ts, f64::NAN).is_err());
        assert!(Reading::new(ts, f64::INFINITY).is_err());
    }

    #[test]
    fn test_reading_clamps_negative() {
        let reading = Reading::new(datetime!(2025-11-23 14:00), -3.0).unwrap();
        assert_eq!(reading.pm25, 0.0);
    }

    #[test]
    fn test_current_conditions_from_server_json() {
        let json = r#"{
            "datetime": "2025-11-23 14:00",
            "current_pm25": 15.3,
            "next_hour_prediction": 16.2,
            "status": "Moderate"
        }"#;
        let current: CurrentConditions = serde_json::from_str(json).unwrap();

        assert_eq!(current.timestamp, datetime!(2025-11-23 14:00));
        assert_eq!(current.next_hour().unwrap(), Some(16.2));
        assert_eq!(current.server_status.as_deref(), Some("Moderate"));
        assert_eq!(current.reading().unwrap().pm25, 15.3);
    }

    #[test]
    fn test_current_conditions_null_prediction() {
        let json = r#"{"datetime": "2025-11-23T14:00:00", "current_pm25": 8.0, "next_hour_prediction": null}"#;
        let current: CurrentConditions = serde_json::from_str(json).unwrap();
        assert_eq!(current.next_hour().unwrap(), None);
        assert!(current.server_status.is_none());
    }

    #[test]
    fn test_current_conditions_missing_value_is_decode_error() {
        let json = r#"{"datetime": "2025-11-23 14:00"}"#;
        assert!(serde_json::from_str::<CurrentConditions>(json).is_err());
    }

    #[test]
    fn test_predictions_response() {
        let json = r#"{"predictions": [
            {"target_datetime": "2025-11-23 15:00", "predicted_pm25": 16.2},
            {"target_datetime": "2025-11-23 16:00", "predicted_pm25": 17.0}
        ]}"#;
        let body: PredictionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.predictions.len(), 2);
        assert_eq!(body.predictions[1].target, datetime!(2025-11-23 16:00));
    }

    #[test]
    fn test_history_point_sitename_optional() {
        let json = r#"{"history": [
            {"datetime": "2025-11-16 14:00", "pm25": 12.0, "sitename": "Tucheng"},
            {"datetime": "2025-11-16 15:00", "pm25": 13.5}
        ]}"#;
        let body: HistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.history[0].sitename.as_deref(), Some("Tucheng"));
        assert!(body.history[1].sitename.is_none());
    }

    #[test]
    fn test_stats_with_null_latest() {
        let json = r#"{"total_measurements": 0, "latest_datetime": null, "prediction_count": 0}"#;
        let stats: ServerStats = serde_json::from_str(json).unwrap();
        assert!(stats.latest_datetime.is_none());
    }

    #[test]
    fn test_chat_message_ids_unique() {
        let a = ChatMessage::new(Sender::User, "hi", MessageStatus::Final);
        let b = ChatMessage::new(Sender::User, "hi", MessageStatus::Final);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
        assert_eq!(
            serde_json::to_string(&MessageStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
