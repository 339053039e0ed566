//! Dashboard snapshot and its derivation.
//!
//! A [`DashboardSnapshot`] is the merged, presentation-ready state of the
//! dashboard. Each sub-fetch result is folded in through one of the
//! `apply_*` methods. Those methods are pure with respect to the outside
//! world (no I/O, no rendering) so the derivation can be tested without a
//! UI. Each method validates its input before writing anything: a rejected
//! payload leaves the snapshot exactly as it was.

use serde::Serialize;
use time::PrimitiveDateTime;

use pm25_types::{
    CurrentConditions, HistoryPoint, ParseResult, Prediction, Reading, serde_timestamp,
};

use crate::series::{self, Trend};
use crate::thresholds::{AqiCategory, Thresholds};

/// Text shown in place of the reading until the first one arrives.
pub const INITIALIZING_TEXT: &str = "Initializing... waiting for the first reading";

/// Text shown for any other absent value.
pub const PLACEHOLDER: &str = "--";

/// Whether the dashboard has data to show yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// No current reading has ever been received.
    Initializing,
    /// At least one current reading has been received.
    Live,
}

/// Merged dashboard state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Latest measured reading.
    pub current: Option<Reading>,
    /// Category of `current`, computed client-side.
    pub category: Option<AqiCategory>,
    /// Next-hour value reported alongside the current reading.
    pub next_hour_pm25: Option<f64>,
    /// Change from `current` to the next hour.
    pub trend: Option<Trend>,
    /// Mean of the forecast.
    pub average_24h: Option<f64>,
    /// Latest forecast, in full.
    pub forecast: Vec<Prediction>,
    /// Latest history, downsampled for charting.
    pub history: Vec<HistoryPoint>,
    /// Category label the server attached to the current reading.
    pub server_status: Option<String>,
    /// Advice text from the status endpoint.
    pub server_advice: Option<String>,
    /// Server time of the latest reading.
    #[serde(with = "serde_timestamp::option")]
    pub last_updated: Option<PrimitiveDateTime>,
    /// Set by the first successful current reading; never cleared.
    pub has_ever_succeeded: bool,
    /// Completed sync cycles.
    pub cycles: u64,
}

impl DashboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.has_ever_succeeded {
            Phase::Live
        } else {
            Phase::Initializing
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.phase() == Phase::Initializing
    }

    /// Advisory text for the current category.
    pub fn advisory(&self) -> Option<&'static str> {
        self.category.map(|c| c.advisory())
    }

    /// Best known next-hour value: the one reported with the current
    /// reading, else the first forecast hour after that reading.
    pub fn next_hour(&self) -> Option<f64> {
        self.next_hour_pm25.or_else(|| {
            let now = self.current.map(|r| r.timestamp);
            self.forecast
                .iter()
                .find(|p| now.is_none_or(|now| p.target > now))
                .map(|p| p.predicted_pm25)
        })
    }

    /// Fold in a current-reading response.
    pub fn apply_current(
        &mut self,
        current: &CurrentConditions,
        thresholds: &Thresholds,
    ) -> ParseResult<()> {
        let reading = current.reading()?;
        let next_hour = current.next_hour()?;

        self.current = Some(reading);
        self.category = Some(thresholds.evaluate(reading.pm25));
        self.next_hour_pm25 = next_hour;
        self.server_status = current.server_status.clone();
        self.last_updated = Some(reading.timestamp);
        self.has_ever_succeeded = true;
        self.refresh_trend();
        Ok(())
    }

    /// Fold in a forecast. An empty forecast changes nothing.
    ///
    /// Returns whether the snapshot was updated.
    pub fn apply_predictions(&mut self, predictions: Vec<Prediction>) -> ParseResult<bool> {
        if predictions.is_empty() {
            return Ok(false);
        }
        let predictions = predictions
            .into_iter()
            .map(Prediction::validate)
            .collect::<ParseResult<Vec<_>>>()?;

        self.average_24h = series::average(&predictions);
        self.forecast = predictions;
        self.refresh_trend();
        Ok(true)
    }

    /// Fold in history, sorted ascending and downsampled by `stride`.
    /// An empty history changes nothing.
    ///
    /// Returns whether the snapshot was updated.
    pub fn apply_history(&mut self, history: Vec<HistoryPoint>, stride: usize) -> ParseResult<bool> {
        if history.is_empty() {
            return Ok(false);
        }
        let mut history = history
            .into_iter()
            .map(HistoryPoint::validate)
            .collect::<ParseResult<Vec<_>>>()?;
        history.sort_by_key(|p| p.timestamp);

        self.history = series::downsample(&history, stride);
        Ok(true)
    }

    /// Store the server's advice text. Blank advice changes nothing.
    pub fn apply_advice(&mut self, advice: String) -> bool {
        let advice = advice.trim();
        if advice.is_empty() {
            return false;
        }
        self.server_advice = Some(advice.to_string());
        true
    }

    fn refresh_trend(&mut self) {
        self.trend = match (self.current, self.next_hour()) {
            (Some(current), Some(next)) => Some(series::trend(current.pm25, next)),
            _ => None,
        };
    }
}
