//! Terminal chart surface.
//!
//! [`TerminalRenderer`] turns chart data into a sparkline that fits the
//! terminal width. Handles are plain values, so destroying one only has to
//! account for it.

use pm25_core::charts::{ChartData, ChartRenderer, ChartSlot};
use pm25_core::series::downsample;
use terminal_size::Width;

use crate::style;

/// Width used when the terminal size is unknown.
pub const DEFAULT_CHART_WIDTH: usize = 60;

/// Room taken by the chart title column.
const TITLE_COLUMNS: usize = 12;

/// Chart width for the current terminal.
pub fn chart_width() -> usize {
    terminal_size::terminal_size()
        .map(|(Width(w), _)| (w as usize).saturating_sub(TITLE_COLUMNS).clamp(10, 120))
        .unwrap_or(DEFAULT_CHART_WIDTH)
}

/// A chart drawn as text.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalChart {
    pub slot: ChartSlot,
    /// Bars; history is fitted to the renderer's width.
    pub line: String,
    pub first_label: String,
    pub last_label: String,
    pub min: f64,
    pub max: f64,
    /// Number of source points before fitting to width.
    pub points: usize,
}

/// Renders charts as sparklines.
///
/// History is thinned to fit the width. The forecast is drawn in full.
#[derive(Debug)]
pub struct TerminalRenderer {
    width: usize,
    live: usize,
}

impl TerminalRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            live: 0,
        }
    }

    /// Charts created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_WIDTH)
    }
}

impl ChartRenderer for TerminalRenderer {
    type Handle = TerminalChart;

    fn create(&mut self, slot: ChartSlot, data: &ChartData) -> TerminalChart {
        // The forecast keeps every hour even if it overflows the width.
        let stride = match slot {
            ChartSlot::History => data.len().div_ceil(self.width),
            ChartSlot::Forecast => 1,
        };
        let values = downsample(&data.values, stride);
        let (min, max) = data
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        self.live += 1;
        TerminalChart {
            slot,
            line: style::sparkline(&values),
            first_label: data.labels.first().cloned().unwrap_or_default(),
            last_label: data.labels.last().cloned().unwrap_or_default(),
            min,
            max,
            points: data.len(),
        }
    }

    fn destroy(&mut self, _slot: ChartSlot, _handle: TerminalChart) {
        self.live = self.live.saturating_sub(1);
    }
}
