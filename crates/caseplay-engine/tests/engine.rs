//! Integration tests for the engine: runs, supersession and autoplay.

use std::sync::Arc;
use std::time::Duration;

use caseplay_core::{
    ClockMode, EventCategory, ReferenceData, ReplayError, RunStatus, RunToken, SubjectId,
};
use caseplay_engine::{Engine, EngineConfig, SequencerConfig};
use caseplay_events::{EventReceiver, ReplayEvent};

const JAMES: &str = "+447700900123";
const SARAH: &str = "+447700900456";

fn reference() -> Arc<ReferenceData> {
    Arc::new(ReferenceData::builtin().unwrap())
}

fn manual_engine() -> Engine {
    Engine::start(EngineConfig::default().with_autoplay(false), reference()).unwrap()
}

/// Collect bus events until run `token` completes.
async fn collect_run(events: &mut EventReceiver, token: RunToken) -> Vec<Arc<ReplayEvent>> {
    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        let done = matches!(
            event.as_ref(),
            ReplayEvent::RunCompleted { token: t, .. } if *t == token
        );
        seen.push(event);
        if done {
            break;
        }
    }
    seen
}

/// Test the full run for a subject in an active outage zone.
#[tokio::test(start_paused = true)]
async fn test_end_to_end_active_outage() {
    let engine = manual_engine();

    let token = engine.request_run_once().await.unwrap();
    let snapshot = engine.wait_for_completion(token).await.unwrap().unwrap();

    assert_eq!(snapshot.subject.as_str(), JAMES);
    assert_eq!(snapshot.events.len(), 6);

    let result = &snapshot.events[4];
    assert_eq!(result.category, EventCategory::Result);
    assert!(result.message.contains("INC-7712"));
    assert!(result.message.contains("186"));

    let last = &snapshot.events[5];
    assert_eq!(last.category, EventCategory::Status);
    assert_eq!(last.message, "Case completed");
    assert_eq!(last.to_string(), "19:16:11 — STATUS — Case completed");

    assert_eq!(snapshot.steps.len(), 4);
    assert_eq!(snapshot.steps[3].label(), "Network outage detected");
    assert_eq!(snapshot.run.status, RunStatus::Completed);
    assert!((snapshot.run.progress - 1.0).abs() < f64::EPSILON);
}

/// Test that a subject without an outage gets three steps and no incident.
#[tokio::test(start_paused = true)]
async fn test_quiet_zone_run() {
    let engine = manual_engine();

    let token = engine.select_subject(SARAH).await.unwrap();
    let snapshot = engine.wait_for_completion(token).await.unwrap().unwrap();

    assert_eq!(snapshot.subject.as_str(), SARAH);
    assert_eq!(snapshot.events[0].message, "Request received for Sarah Collins");
    assert_eq!(snapshot.events[2].message, "Account OK — 5.1 GB remaining");
    assert_eq!(snapshot.events[4].message, "No outage detected");
    assert_eq!(
        snapshot
            .steps
            .iter()
            .map(|s| s.label().to_string())
            .collect::<Vec<_>>(),
        vec![
            "CRM verification",
            "Account entitlement check",
            "Location correlation"
        ]
    );
}

/// Test event order and monotonic progress as seen on the bus.
#[tokio::test(start_paused = true)]
async fn test_bus_order_and_progress() {
    let engine = manual_engine();
    let mut events = engine.events();

    let token = engine.request_run_once().await.unwrap();
    let seen = collect_run(&mut events, token).await;

    assert!(matches!(
        seen[0].as_ref(),
        ReplayEvent::RunStarted { token: t, .. } if *t == token
    ));

    let categories: Vec<EventCategory> = seen
        .iter()
        .filter_map(|e| match e.as_ref() {
            ReplayEvent::EventEmitted { event, .. } => Some(event.category),
            _ => None,
        })
        .collect();
    assert_eq!(
        categories,
        vec![
            EventCategory::Request,
            EventCategory::System,
            EventCategory::Validation,
            EventCategory::System,
            EventCategory::Result,
            EventCategory::Status,
        ]
    );

    let progress: Vec<f64> = seen
        .iter()
        .filter_map(|e| match e.as_ref() {
            ReplayEvent::ProgressChanged { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!((progress.last().unwrap() - 1.0).abs() < f64::EPSILON);
}

/// Test that a newer run leaves only its own output behind.
#[tokio::test(start_paused = true)]
async fn test_supersession_isolates_runs() {
    let engine = manual_engine();
    let mut events = engine.events();

    let first = engine.select_subject(JAMES).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let second = engine.select_subject(SARAH).await.unwrap();

    assert!(engine.wait_for_completion(first).await.unwrap().is_none());
    let snapshot = engine.wait_for_completion(second).await.unwrap().unwrap();

    assert_eq!(snapshot.output_of, second);
    assert_eq!(snapshot.events.len(), 6);
    assert!(
        snapshot
            .events
            .iter()
            .all(|e| !e.message.contains("James Walker"))
    );
    assert_eq!(snapshot.steps.len(), 3);

    // Nothing from the first run is published once the second has started.
    let seen = collect_run(&mut events, second).await;
    let second_start = seen
        .iter()
        .position(|e| matches!(e.as_ref(), ReplayEvent::RunStarted { token: t, .. } if *t == second))
        .unwrap();
    assert!(
        seen[second_start..]
            .iter()
            .all(|e| e.token() == Some(second))
    );

    // Outlive the first run's schedule; it must stay silent.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(events.try_recv().is_none());
    assert_eq!(engine.snapshot(), snapshot);
}

/// Test that issued tokens strictly increase.
#[tokio::test(start_paused = true)]
async fn test_tokens_strictly_increase() {
    let engine = manual_engine();
    let mut previous = RunToken::NONE;

    for _ in 0..5 {
        let token = engine.request_run_once().await.unwrap();
        assert!(token > previous);
        previous = token;
    }

    let snapshot = engine.wait_for_completion(previous).await.unwrap().unwrap();
    assert_eq!(snapshot.token, previous);
}

/// Test that an unknown subject is reported and changes nothing.
#[tokio::test(start_paused = true)]
async fn test_unknown_subject_is_rejected() {
    let engine = manual_engine();
    let token = engine.request_run_once().await.unwrap();
    engine.wait_for_completion(token).await.unwrap();
    let before = engine.snapshot();

    let err = engine.select_subject("+10000000000").await.unwrap_err();

    assert!(matches!(err, ReplayError::UnknownSubject { .. }));
    assert_eq!(engine.snapshot(), before);
}

/// Test that autoplay alternates subjects and returns after two periods.
#[tokio::test(start_paused = true)]
async fn test_autoplay_alternates_subjects() {
    let config = EngineConfig::default()
        .with_autoplay(true)
        .with_initial_subject(JAMES);
    let engine = Engine::start(config, reference()).unwrap();

    let token = engine.request_run_once().await.unwrap();
    engine.wait_for_completion(token).await.unwrap();
    assert_eq!(engine.snapshot().subject.as_str(), JAMES);

    tokio::time::sleep(Duration::from_secs(20)).await;
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.subject.as_str(), SARAH);
    assert_eq!(snapshot.run.status, RunStatus::Completed);

    tokio::time::sleep(Duration::from_secs(16)).await;
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.subject.as_str(), JAMES);
    assert_eq!(snapshot.run.status, RunStatus::Completed);
    assert_eq!(snapshot.token, RunToken(3));
}

/// Test that pausing autoplay stops subject changes but not manual runs.
#[tokio::test(start_paused = true)]
async fn test_pausing_autoplay() {
    let engine = Engine::start(EngineConfig::default(), reference()).unwrap();

    assert!(engine.set_autoplay_enabled(false).await.unwrap());
    assert!(!engine.set_autoplay_enabled(false).await.unwrap());

    tokio::time::sleep(Duration::from_secs(40)).await;
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.token, RunToken::NONE);
    assert_eq!(snapshot.run.status, RunStatus::Idle);

    let token = engine.request_run_once().await.unwrap();
    let snapshot = engine.wait_for_completion(token).await.unwrap().unwrap();
    assert_eq!(snapshot.subject.as_str(), JAMES);
}

/// Test that a manual re-run keeps the subject.
#[tokio::test(start_paused = true)]
async fn test_run_once_keeps_subject() {
    let engine = manual_engine();
    engine.select_subject(SARAH).await.unwrap();

    let token = engine.request_run_once().await.unwrap();
    let snapshot = engine.wait_for_completion(token).await.unwrap().unwrap();

    assert_eq!(snapshot.subject.as_str(), SARAH);
    assert_eq!(token, RunToken(2));
}

/// Test the per-step clock through the engine configuration.
#[tokio::test(start_paused = true)]
async fn test_per_step_clock() {
    let config = EngineConfig::default()
        .with_autoplay(false)
        .with_sequencer(SequencerConfig::default().with_clock_mode(ClockMode::PerStep));
    let engine = Engine::start(config, reference()).unwrap();

    let token = engine.request_run_once().await.unwrap();
    let snapshot = engine.wait_for_completion(token).await.unwrap().unwrap();

    assert_eq!(snapshot.events[0].clock_label(), "19:16:10");
    assert_eq!(snapshot.events[5].clock_label(), "19:16:15");
}

/// Test that the engine rejects a missing initial subject.
#[tokio::test(start_paused = true)]
async fn test_unknown_initial_subject() {
    let config = EngineConfig::default().with_initial_subject(SubjectId::new("+10000000000"));
    let err = Engine::start(config, reference()).unwrap_err();
    assert!(matches!(err, ReplayError::UnknownSubject { .. }));
}

/// Test that shutdown completes while autoplay is still enabled.
#[tokio::test(start_paused = true)]
async fn test_shutdown_with_autoplay_enabled() {
    let engine = Engine::start(EngineConfig::default(), reference()).unwrap();
    engine.request_run_once().await.unwrap();
    engine.shutdown().await;
}

/// Test that an autoplay tick supersedes a run still in flight.
#[tokio::test(start_paused = true)]
async fn test_autoplay_tick_supersedes_running_run() {
    let config = EngineConfig::default()
        .with_autoplay(true)
        .with_autoplay_period(Duration::from_secs(2))
        .with_initial_subject(JAMES);
    let engine = Engine::start(config, reference()).unwrap();

    let first = engine.request_run_once().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert!(engine.set_autoplay_enabled(false).await.unwrap());

    assert!(engine.wait_for_completion(first).await.unwrap().is_none());
    let second = RunToken(2);
    let snapshot = engine.wait_for_completion(second).await.unwrap().unwrap();

    assert_eq!(snapshot.subject.as_str(), SARAH);
    assert_eq!(snapshot.output_of, second);
    assert_eq!(snapshot.events.len(), 6);
    assert!(
        snapshot
            .events
            .iter()
            .all(|e| !e.message.contains("James Walker"))
    );
    assert_eq!(snapshot.steps.len(), 3);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(engine.snapshot(), snapshot);
}

/// Test that a zero autoplay period is rejected at startup.
#[tokio::test(start_paused = true)]
async fn test_zero_autoplay_period_rejected() {
    let config = EngineConfig::default()
        .with_autoplay(true)
        .with_autoplay_period(Duration::ZERO);
    let err = Engine::start(config, reference()).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::InvalidConfig { ref field, .. } if field == "autoplay.period"
    ));

    let disabled = EngineConfig::default()
        .with_autoplay(false)
        .with_autoplay_period(Duration::ZERO);
    assert!(Engine::start(disabled, reference()).is_err());
}
