//! End-to-end tests for the sync engine and chat session against the mock
//! server.
//!
//! These run without a network: `MockApi` stands in for the prediction
//! server and `RetainedRenderer` for the chart surface.

use std::sync::Arc;
use std::time::Duration;

use time::macros::datetime;

use pm25_core::charts::RetainedRenderer;
use pm25_core::chat::{APOLOGY_MESSAGE, UNREACHABLE_MESSAGE};
use pm25_core::mock::{Endpoint, MockApi, MockFailure};
use pm25_core::snapshot::INITIALIZING_TEXT;
use pm25_core::{
    AqiCategory, ChartSlot, ChatSession, DashboardApi, Direction, MessageStatus, Phase, Prediction,
    SourceStatus, SyncConfig, SyncEngine,
};

fn engine(api: Arc<MockApi>) -> SyncEngine<Arc<MockApi>, RetainedRenderer> {
    SyncEngine::new(api, RetainedRenderer::default(), SyncConfig::default())
}

#[tokio::test]
async fn test_recovers_from_initial_outage() {
    let api = Arc::new(MockApi::new());
    api.fail(Endpoint::Current, MockFailure::Transport).await;
    let mut engine = engine(Arc::clone(&api));

    let report = engine.run_cycle().await;
    assert!(report.current.is_failed());
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase(), Phase::Initializing);
    assert_eq!(snapshot.category, None);
    assert_eq!(snapshot.advisory(), None);
    assert!(!INITIALIZING_TEXT.is_empty());

    api.recover(Endpoint::Current).await;
    api.set_reading(datetime!(2025-11-23 15:00), 40.0).await;

    let report = engine.run_cycle().await;
    assert_eq!(report.current, SourceStatus::Updated);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase(), Phase::Live);
    assert_eq!(
        snapshot.category,
        Some(AqiCategory::UnhealthyForSensitiveGroups)
    );
    assert_eq!(
        snapshot.advisory(),
        Some(AqiCategory::UnhealthyForSensitiveGroups.advisory())
    );
    assert_eq!(snapshot.last_updated, Some(datetime!(2025-11-23 15:00)));
}

#[tokio::test]
async fn test_stays_live_after_later_outage() {
    let api = Arc::new(MockApi::new());
    let mut engine = engine(Arc::clone(&api));
    engine.run_cycle().await;
    let before = engine.snapshot().current;

    for endpoint in [
        Endpoint::Current,
        Endpoint::Predictions,
        Endpoint::History,
        Endpoint::Advice,
    ] {
        api.fail(endpoint, MockFailure::Timeout).await;
    }
    let report = engine.run_cycle().await;

    assert_eq!(report.failures(), 4);
    assert!(!engine.snapshot().is_initializing());
    assert_eq!(engine.snapshot().current, before);
    assert_eq!(engine.charts().live_count(), 2);
}

#[tokio::test]
async fn test_trend_and_average_follow_forecast() {
    let api = Arc::new(MockApi::new());
    let mut current = api.current().await.unwrap();
    current.next_hour_prediction = None;
    current.current_pm25 = 20.0;
    api.set_current(current).await;
    api.set_predictions(vec![
        Prediction {
            target: datetime!(2025-11-23 15:00),
            predicted_pm25: 18.0,
        },
        Prediction {
            target: datetime!(2025-11-23 16:00),
            predicted_pm25: 22.0,
        },
    ])
    .await;

    let mut engine = engine(api);
    engine.run_cycle().await;

    let snapshot = engine.snapshot();
    let trend = snapshot.trend.unwrap();
    assert_eq!(trend.direction, Direction::Down);
    assert!((trend.delta + 2.0).abs() < 1e-9);
    assert_eq!(snapshot.average_24h, Some(20.0));
}

#[tokio::test]
async fn test_malformed_payload_is_isolated() {
    let api = Arc::new(MockApi::new());
    api.set_predictions(vec![Prediction {
        target: datetime!(2025-11-23 15:00),
        predicted_pm25: f64::NAN,
    }])
    .await;
    let mut engine = engine(api);

    let report = engine.run_cycle().await;

    assert!(report.predictions.is_failed());
    assert_eq!(report.history, SourceStatus::Updated);
    assert!(engine.snapshot().forecast.is_empty());
    assert!(!engine.charts().is_live(ChartSlot::Forecast));
}

#[tokio::test(start_paused = true)]
async fn test_slow_source_does_not_block_others() {
    let api = Arc::new(MockApi::new());
    api.set_latency(Endpoint::History, Duration::from_secs(8));
    let mut engine = engine(Arc::clone(&api));

    let start = tokio::time::Instant::now();
    let report = engine.run_cycle().await;

    // sub-fetches overlap, so the cycle takes as long as the slowest one
    assert!(start.elapsed() < Duration::from_secs(9));
    assert_eq!(report.failures(), 0);
}

#[tokio::test]
async fn test_chat_outcomes() {
    let api = MockApi::new();
    let mut session = ChatSession::new();

    let reply = session.send(&api, "Is it safe to run?").await.unwrap();
    assert_eq!(reply.status, MessageStatus::Final);

    api.fail(
        Endpoint::Chat,
        MockFailure::Api {
            status: 500,
            message: "model unavailable".into(),
        },
    )
    .await;
    let reply = session.send(&api, "And tomorrow?").await.unwrap();
    assert_eq!(reply.text, APOLOGY_MESSAGE);

    api.fail(Endpoint::Chat, MockFailure::Transport).await;
    let reply = session.send(&api, "Hello?").await.unwrap();
    assert_eq!(reply.text, UNREACHABLE_MESSAGE);

    assert_eq!(session.messages().len(), 6);
    assert!(session.messages().iter().all(|m| !m.is_pending()));
}
