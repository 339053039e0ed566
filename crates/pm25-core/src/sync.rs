//! Dashboard synchronization.
//!
//! The [`SyncEngine`] periodically pulls the four dashboard sources from the
//! server and folds each result into the [`DashboardSnapshot`] as soon as it
//! arrives. Sources are isolated from each other: a failure in one only
//! means its fields keep their previous value.
//!
//! All sub-fetches of a cycle run concurrently on the calling task; nothing
//! is spawned. Derivation and chart rendering happen synchronously between
//! network completions, so no half-applied state is ever observable.
//!
//! ```text
//!            +--> current ------+
//!  tick ---> +--> predictions --+--> apply_* --> snapshot --> charts
//!            +--> history ------+
//!            +--> advice -------+
//! ```

use std::time::Duration;

use futures::StreamExt;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::FuturesUnordered;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pm25_types::{CurrentConditions, HistoryPoint, Prediction};

use crate::charts::{ChartData, ChartRegistry, ChartRenderer, ChartSlot};
use crate::error::{ApiError, Result};
use crate::snapshot::DashboardSnapshot;
use crate::thresholds::{ThresholdConfig, Thresholds};
use crate::traits::DashboardApi;

/// Default time between sync cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default history downsample stride.
pub const DEFAULT_HISTORY_STRIDE: usize = 3;

/// Sync engine settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between cycles.
    pub refresh_interval: Duration,
    /// History window requested from the server, in hours.
    pub history_hours: u32,
    /// Keep every n-th history point for charting.
    pub history_stride: usize,
    /// Category bounds.
    pub thresholds: ThresholdConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            history_hours: 168,
            history_stride: DEFAULT_HISTORY_STRIDE,
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// One of the independent requests that make up a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Current,
    Predictions,
    History,
    Advice,
}

/// What a cycle did with one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// New data was folded into the snapshot.
    Updated,
    /// The source answered with nothing new (empty dataset).
    Unchanged,
    /// The request or its payload failed; previous data was kept.
    Failed(String),
}

impl SourceStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SourceStatus::Failed(_))
    }
}

/// Per-source outcome of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub current: SourceStatus,
    pub predictions: SourceStatus,
    pub history: SourceStatus,
    pub advice: SourceStatus,
}

impl CycleReport {
    fn new(cycle: u64) -> Self {
        let pending = || SourceStatus::Failed("no response".to_string());
        Self {
            cycle,
            current: pending(),
            predictions: pending(),
            history: pending(),
            advice: pending(),
        }
    }

    fn slot(&mut self, source: Source) -> &mut SourceStatus {
        match source {
            Source::Current => &mut self.current,
            Source::Predictions => &mut self.predictions,
            Source::History => &mut self.history,
            Source::Advice => &mut self.advice,
        }
    }

    /// Number of sources that failed.
    pub fn failures(&self) -> usize {
        [&self.current, &self.predictions, &self.history, &self.advice]
            .into_iter()
            .filter(|s| s.is_failed())
            .count()
    }
}

enum Outcome {
    Current(Result<CurrentConditions>),
    Predictions(Result<Vec<Prediction>>),
    History(Result<Vec<HistoryPoint>>),
    Advice(Result<String>),
}

/// Timer-driven orchestrator that keeps a [`DashboardSnapshot`] current.
pub struct SyncEngine<A, R: ChartRenderer> {
    api: A,
    config: SyncConfig,
    thresholds: Thresholds,
    snapshot: DashboardSnapshot,
    charts: ChartRegistry<R>,
    cycles: u64,
    published: watch::Sender<DashboardSnapshot>,
}

impl<A: DashboardApi, R: ChartRenderer> SyncEngine<A, R> {
    pub fn new(api: A, renderer: R, config: SyncConfig) -> Self {
        Self {
            api,
            thresholds: Thresholds::new(config.thresholds),
            config,
            snapshot: DashboardSnapshot::new(),
            charts: ChartRegistry::new(renderer),
            cycles: 0,
            published: watch::Sender::new(DashboardSnapshot::new()),
        }
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn charts(&self) -> &ChartRegistry<R> {
        &self.charts
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Receive a copy of the snapshot after every cycle.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.published.subscribe()
    }

    /// Number of completed cycles.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    /// Run one sync cycle.
    ///
    /// Dispatches all sub-fetches at once and applies each result as it
    /// completes, in whatever order they finish.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let cycle = self.cycles + 1;
        let mut report = CycleReport::new(cycle);
        let hours = self.config.history_hours;
        let api = &self.api;

        let mut pending: FuturesUnordered<LocalBoxFuture<'_, Outcome>> = FuturesUnordered::new();
        pending.push(async move { Outcome::Current(api.current().await) }.boxed_local());
        pending.push(async move { Outcome::Predictions(api.predictions().await) }.boxed_local());
        pending.push(async move { Outcome::History(api.history(hours).await) }.boxed_local());
        pending.push(async move { Outcome::Advice(api.advice().await) }.boxed_local());

        while let Some(outcome) = pending.next().await {
            let (source, status) = apply_outcome(
                &mut self.snapshot,
                &mut self.charts,
                &self.thresholds,
                self.config.history_stride,
                outcome,
            );
            match &status {
                SourceStatus::Failed(reason) => {
                    warn!("Cycle {}: {:?} failed: {}", cycle, source, reason)
                }
                other => debug!("Cycle {}: {:?} {:?}", cycle, source, other),
            }
            *report.slot(source) = status;
        }
        drop(pending);

        self.cycles = cycle;
        self.snapshot.cycles = cycle;
        if self.snapshot.is_initializing() {
            info!("Cycle {}: still waiting for the first reading", cycle);
        }
        self.published.send_replace(self.snapshot.clone());
        report
    }

    /// Run cycles until `cancel` fires.
    ///
    /// The first cycle runs immediately, then one per refresh interval.
    /// `on_cycle` is called after every cycle with the updated snapshot and
    /// live charts. A cycle in progress is allowed to finish.
    pub async fn run<F>(&mut self, cancel: CancellationToken, mut on_cycle: F)
    where
        F: FnMut(&CycleReport, &DashboardSnapshot, &ChartRegistry<R>),
    {
        info!(
            "Starting sync engine (interval: {}s, history: {}h, stride: {})",
            self.config.refresh_interval.as_secs(),
            self.config.history_hours,
            self.config.history_stride
        );

        let mut ticker = interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    on_cycle(&report, &self.snapshot, &self.charts);
                }
            }
        }

        info!("Sync engine stopped after {} cycle(s)", self.cycles);
    }
}

/// Fold one sub-fetch result into the snapshot and re-render its chart.
fn apply_outcome<R: ChartRenderer>(
    snapshot: &mut DashboardSnapshot,
    charts: &mut ChartRegistry<R>,
    thresholds: &Thresholds,
    history_stride: usize,
    outcome: Outcome,
) -> (Source, SourceStatus) {
    match outcome {
        Outcome::Current(result) => {
            let status = settle(
                result.and_then(|current| {
                    snapshot
                        .apply_current(&current, thresholds)
                        .map_err(ApiError::from)
                }),
                |()| true,
            );
            (Source::Current, status)
        }
        Outcome::Predictions(result) => {
            let status = settle(
                result.and_then(|p| snapshot.apply_predictions(p).map_err(ApiError::from)),
                |updated| updated,
            );
            if status == SourceStatus::Updated {
                charts.render_data(
                    ChartSlot::Forecast,
                    &ChartData::from_forecast(&snapshot.forecast),
                );
            }
            (Source::Predictions, status)
        }
        Outcome::History(result) => {
            let status = settle(
                result.and_then(|h| {
                    snapshot
                        .apply_history(h, history_stride)
                        .map_err(ApiError::from)
                }),
                |updated| updated,
            );
            if status == SourceStatus::Updated {
                charts.render_data(
                    ChartSlot::History,
                    &ChartData::from_history(&snapshot.history),
                );
            }
            (Source::History, status)
        }
        Outcome::Advice(result) => {
            let status = settle(result.map(|a| snapshot.apply_advice(a)), |updated| updated);
            (Source::Advice, status)
        }
    }
}

fn settle<T>(result: Result<T>, updated: impl FnOnce(T) -> bool) -> SourceStatus {
    match result {
        Ok(value) => {
            if updated(value) {
                SourceStatus::Updated
            } else {
                SourceStatus::Unchanged
            }
        }
        Err(e) => SourceStatus::Failed(e.to_string()),
    }
}
