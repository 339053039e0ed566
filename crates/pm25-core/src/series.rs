//! Derivations over PM2.5 series.
//!
//! Pure functions that turn raw server series into what the dashboard shows:
//! the next-hour trend, the forecast average, downsampled history, and axis
//! labels.

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use pm25_types::Prediction;

/// Direction of the next-hour change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// How a direction should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    /// Pollution is rising.
    Warning,
    /// Pollution is steady or falling.
    Favorable,
}

impl Direction {
    pub fn tone(&self) -> Tone {
        match self {
            Direction::Up => Tone::Warning,
            Direction::Down => Tone::Favorable,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
        }
    }
}

/// Change between the current reading and the next-hour prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// `next_hour - current`, in µg/m³.
    pub delta: f64,
    pub direction: Direction,
}

/// Compute the next-hour trend.
///
/// The direction is [`Direction::Up`] only when the delta is strictly
/// positive; no change counts as down.
pub fn trend(current: f64, next_hour: f64) -> Trend {
    let delta = next_hour - current;
    let direction = if delta > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };
    Trend { delta, direction }
}

/// Mean predicted concentration, or `None` for an empty forecast.
pub fn average(predictions: &[Prediction]) -> Option<f64> {
    if predictions.is_empty() {
        return None;
    }
    let sum: f64 = predictions.iter().map(|p| p.predicted_pm25).sum();
    Some(sum / predictions.len() as f64)
}

/// Keep every `stride`-th element, starting with the first.
///
/// A stride of 0 or 1 keeps everything.
pub fn downsample<T: Clone>(series: &[T], stride: usize) -> Vec<T> {
    series.iter().step_by(stride.max(1)).cloned().collect()
}

/// Which chart an axis label is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    /// Hour only, e.g. `9:00`.
    Forecast,
    /// Month, day and hour, e.g. `11/3 9:00`.
    History,
}

/// Format an axis label. Numbers are not zero-padded.
pub fn format_axis_label(ts: PrimitiveDateTime, kind: AxisKind) -> String {
    match kind {
        AxisKind::Forecast => format!("{}:00", ts.hour()),
        AxisKind::History => format!("{}/{} {}:00", u8::from(ts.month()), ts.day(), ts.hour()),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Downsampling keeps exactly the indices divisible by the stride.
        #[test]
        fn downsample_keeps_multiples(len in 0usize..200, stride in 1usize..10) {
            let series: Vec<usize> = (0..len).collect();
            let kept = downsample(&series, stride);
            prop_assert_eq!(kept.len(), len.div_ceil(stride));
            prop_assert!(kept.iter().all(|i| i % stride == 0));
        }

        #[test]
        fn trend_direction_matches_delta(a in 0.0f64..500.0, b in 0.0f64..500.0) {
            let t = trend(a, b);
            prop_assert_eq!(t.direction == Direction::Up, b - a > 0.0);
        }
    }
}
