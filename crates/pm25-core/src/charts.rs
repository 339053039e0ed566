//! Chart lifecycle management.
//!
//! The dashboard has a fixed set of chart slots. Each slot holds at most one
//! live renderer handle; re-rendering a slot destroys the old handle before
//! creating the new one, so a slot never holds two live charts.
//!
//! Drawing is delegated to a [`ChartRenderer`]. The registry only decides
//! *when* handles are created and released.
//!
//! # Example
//!
//! ```
//! use pm25_core::charts::{ChartRegistry, ChartSlot, RetainedRenderer};
//!
//! let mut charts = ChartRegistry::new(RetainedRenderer::default());
//! charts.render(ChartSlot::Forecast, vec!["15:00".into()], vec![16.2]);
//! charts.render(ChartSlot::Forecast, vec!["16:00".into()], vec![17.0]);
//!
//! assert_eq!(charts.live_count(), 1);
//! assert_eq!(charts.renderer().destroyed(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use pm25_types::{HistoryPoint, Prediction};

use crate::series::{AxisKind, format_axis_label};

/// A chart position on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartSlot {
    /// Next 24 hours of predictions.
    Forecast,
    /// Downsampled measurement history.
    History,
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartSlot::Forecast => write!(f, "forecast"),
            ChartSlot::History => write!(f, "history"),
        }
    }
}

/// Labels and values for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartData {
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Self {
        Self { labels, values }
    }

    /// Forecast chart: hour labels, every prediction.
    pub fn from_forecast(predictions: &[Prediction]) -> Self {
        Self {
            labels: predictions
                .iter()
                .map(|p| format_axis_label(p.target, AxisKind::Forecast))
                .collect(),
            values: predictions.iter().map(|p| p.predicted_pm25).collect(),
        }
    }

    /// History chart: date and hour labels.
    pub fn from_history(points: &[HistoryPoint]) -> Self {
        Self {
            labels: points
                .iter()
                .map(|p| format_axis_label(p.timestamp, AxisKind::History))
                .collect(),
            values: points.iter().map(|p| p.pm25).collect(),
        }
    }

    /// Non-empty, one label per value, all values finite.
    pub fn is_renderable(&self) -> bool {
        !self.values.is_empty()
            && self.labels.len() == self.values.len()
            && self.values.iter().all(|v| v.is_finite())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Backend that turns chart data into something visible.
///
/// Handles own whatever the backend allocates for a chart. The registry
/// calls [`destroy`](ChartRenderer::destroy) exactly once per handle it
/// received from [`create`](ChartRenderer::create).
pub trait ChartRenderer {
    /// A live chart.
    type Handle;

    /// Draw a chart. Only called with renderable data.
    fn create(&mut self, slot: ChartSlot, data: &ChartData) -> Self::Handle;

    /// Release a chart previously returned by `create`.
    fn destroy(&mut self, slot: ChartSlot, handle: Self::Handle);
}

/// Renderer that keeps the data it was given.
///
/// Useful for headless frontends (JSON output) and for tests.
#[derive(Debug, Default)]
pub struct RetainedRenderer {
    created: usize,
    destroyed: usize,
}

impl RetainedRenderer {
    /// Number of handles created so far.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Number of handles released so far.
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
}

impl ChartRenderer for RetainedRenderer {
    type Handle = ChartData;

    fn create(&mut self, _slot: ChartSlot, data: &ChartData) -> ChartData {
        self.created += 1;
        data.clone()
    }

    fn destroy(&mut self, _slot: ChartSlot, _handle: ChartData) {
        self.destroyed += 1;
    }
}

/// Keyed registry of live charts, one per slot.
pub struct ChartRegistry<R: ChartRenderer> {
    renderer: R,
    live: HashMap<ChartSlot, R::Handle>,
}

impl<R: ChartRenderer> ChartRegistry<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            live: HashMap::new(),
        }
    }

    /// Render a chart into `slot`, replacing any live chart there.
    ///
    /// Empty or malformed data (label/value count mismatch, non-finite
    /// values) is ignored and the slot keeps its current state. Returns
    /// whether a new chart was created.
    pub fn render(&mut self, slot: ChartSlot, labels: Vec<String>, values: Vec<f64>) -> bool {
        self.render_data(slot, &ChartData::new(labels, values))
    }

    /// Like [`render`](Self::render), for prepared chart data.
    pub fn render_data(&mut self, slot: ChartSlot, data: &ChartData) -> bool {
        if !data.is_renderable() {
            debug!(
                "Skipping {} chart: {} labels, {} values",
                slot,
                data.labels.len(),
                data.values.len()
            );
            return false;
        }

        if let Some(old) = self.live.remove(&slot) {
            self.renderer.destroy(slot, old);
        }
        let handle = self.renderer.create(slot, data);
        self.live.insert(slot, handle);
        true
    }

    /// The live chart for a slot, if any.
    pub fn get(&self, slot: ChartSlot) -> Option<&R::Handle> {
        self.live.get(&slot)
    }

    pub fn is_live(&self, slot: ChartSlot) -> bool {
        self.live.contains_key(&slot)
    }

    /// Number of slots holding a live chart.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Destroy every live chart.
    pub fn clear(&mut self) {
        for (slot, handle) in self.live.drain() {
            self.renderer.destroy(slot, handle);
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: ChartRenderer> Drop for ChartRegistry<R> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<R: ChartRenderer> fmt::Debug for ChartRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartRegistry")
            .field("live", &self.live.keys().collect::<Vec<_>>())
            .finish()
    }
}
