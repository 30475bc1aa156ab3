//! Cooperative cancellation at every point of a run.

use super::*;
use fusebench_core::CancellationSignal;
use fusebench_sequencer::{RunOutcome, SequenceState};

#[tokio::test(start_paused = true)]
async fn cancel_before_start_yields_no_results() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, sources) = rig(ExactMeter::new(), config);

    let signal = CancellationSignal::new();
    signal.cancel();
    let outcome = orch.start_with_signal(signal).await.unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled);
    let events = drain(&mut rx);
    assert!(results(&events).is_empty());
    assert_eq!(statuses(&events).last().unwrap(), "Test sequence cancelled");
    assert!(!statuses(&events).iter().any(|s| s.starts_with("Running")));

    // nothing was driven; the closing power-down still ran
    for source in &sources {
        assert_eq!(source.calls(), vec![Call::Disable, Call::SetVoltage(0.0)]);
    }
    assert_powered_down(&sources);
    assert_eq!(orch.state(), SequenceState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_stabilization_drops_the_case() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, sources) = rig(ExactMeter::new(), config);
    let run = orch.spawn();

    // case 3 settles from 800 ms to 900 ms
    tokio::time::sleep(Duration::from_millis(850)).await;
    assert!(orch.cancel());

    assert_eq!(run.await.unwrap().unwrap(), RunOutcome::Cancelled);

    let events = drain(&mut rx);
    let results = results(&events);
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].name(), "Test_02");

    let statuses = statuses(&events);
    assert!(statuses.contains(&"Running Test_03 (3/8)".to_string()));
    assert!(!statuses.contains(&"Running Test_04 (4/8)".to_string()));
    assert_eq!(statuses.last().unwrap(), "Test sequence cancelled");

    assert_powered_down(&sources);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_pause_stops_before_next_case() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, sources) = rig(ExactMeter::new(), config);
    let run = orch.spawn();

    // first pause runs from 100 ms to 400 ms
    tokio::time::sleep(Duration::from_millis(250)).await;
    orch.cancel();

    assert_eq!(run.await.unwrap().unwrap(), RunOutcome::Cancelled);
    let events = drain(&mut rx);
    assert_eq!(results(&events).len(), 1);
    assert!(!statuses(&events).contains(&"Running Test_02 (2/8)".to_string()));
    assert_powered_down(&sources);
}

#[tokio::test(start_paused = true)]
async fn external_signal_cancels_a_running_sequence() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, sources) = rig(ExactMeter::new(), config);

    let signal = CancellationSignal::new();
    let remote = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_250)).await;
        remote.cancel();
    });

    let outcome = orch.start_with_signal(signal).await.unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled);
    // cases start at 0, 400, 800, 1200 ms; the fourth is aborted while settling
    assert_eq!(results(&drain(&mut rx)).len(), 3);
    assert_powered_down(&sources);
}

#[tokio::test(start_paused = true)]
async fn cancel_reports_whether_a_run_was_active() {
    let (orch, _) = rig(ExactMeter::new(), SequencerConfig::default());
    assert!(!orch.cancel());

    let run = orch.spawn();
    while !orch.is_running() {
        tokio::task::yield_now().await;
    }
    assert!(orch.cancel());
    run.await.unwrap().unwrap();

    assert!(!orch.cancel());
}

#[tokio::test(start_paused = true)]
async fn cancelled_orchestrator_can_start_again() {
    let (config, mut rx) = with_channel(SequencerConfig::builder().without_delays());
    let (orch, _) = rig(ExactMeter::new(), config);

    let signal = CancellationSignal::new();
    signal.cancel();
    assert_eq!(
        orch.start_with_signal(signal).await.unwrap(),
        RunOutcome::Cancelled
    );
    assert_eq!(orch.start().await.unwrap(), RunOutcome::Completed);
    assert_eq!(results(&drain(&mut rx)).len(), 8);
}

#[tokio::test(start_paused = true)]
async fn aborting_the_run_task_still_powers_down() {
    let (orch, sources) = rig(ExactMeter::new(), SequencerConfig::default());
    let run = orch.spawn();

    // inside the first stabilization delay, sources are on
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sources.iter().all(|s| s.is_on()));

    run.abort();
    let _ = run.await;

    // let the spawned power-down finish
    for _ in 0..1_000 {
        if sources.iter().all(|s| !s.is_on()) {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_powered_down(&sources);
    assert_eq!(orch.state(), SequenceState::Cancelled);
}
