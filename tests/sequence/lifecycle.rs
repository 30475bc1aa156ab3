//! Full runs: ordering, protocol, statuses, and restart.

use super::*;
use fusebench_instrument::{Integration, MeterRange};
use fusebench_sequencer::{RunOutcome, SequenceError, SequenceState};

#[tokio::test(start_paused = true)]
async fn exact_meter_passes_every_case_in_order() {
    let (config, mut rx) = with_channel(SequencerConfig::builder().name("e2e"));
    let (orch, sources) = rig(ExactMeter::new(), config);

    let outcome = orch.start().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let events = drain(&mut rx);
    let results = results(&events);
    let names: Vec<_> = results.iter().map(|r| r.name().to_string()).collect();
    assert_eq!(
        names,
        vec!["Test_01", "Test_02", "Test_03", "Test_04", "Test_05", "Test_06", "Test_07", "Test_08"]
    );
    assert!(results.iter().all(|r| r.passed() && r.message() == "PASS"));

    let statuses = statuses(&events);
    assert_eq!(statuses.first().unwrap(), "Initializing test sequence");
    assert_eq!(statuses[1], "Starting test sequence (8 cases)");
    assert_eq!(statuses[2], "Running Test_01 (1/8)");
    assert_eq!(statuses.last().unwrap(), "All tests completed");

    assert_powered_down(&sources);
    assert_eq!(orch.state(), SequenceState::Completed);
}

#[tokio::test(start_paused = true)]
async fn status_for_each_case_precedes_its_result() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, _) = rig(ExactMeter::new(), config);
    orch.start().await.unwrap();

    let mut expected_next = 1;
    let mut pending: Option<String> = None;
    for event in drain(&mut rx) {
        match event {
            SequenceEvent::StatusChanged { text, .. } if text.starts_with("Running") => {
                assert!(pending.is_none(), "two cases started without a result");
                assert_eq!(text, format!("Running Test_{expected_next:02} ({expected_next}/8)"));
                pending = Some(format!("Test_{expected_next:02}"));
            }
            SequenceEvent::TestResultAvailable { result, .. } => {
                assert_eq!(Some(result.name().to_string()), pending.take());
                expected_next += 1;
            }
            _ => {}
        }
    }
    assert_eq!(expected_next, 9);
}

#[tokio::test(start_paused = true)]
async fn state_transitions_bracket_the_run() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, _) = rig(ExactMeter::new(), config);
    orch.start().await.unwrap();

    let events = drain(&mut rx);
    let transitions: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SequenceEvent::StateTransition { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (SequenceState::Idle, SequenceState::Running),
            (SequenceState::Running, SequenceState::Completed),
        ]
    );
    assert!(matches!(events.first(), Some(SequenceEvent::StateTransition { .. })));
    assert!(matches!(events.last(), Some(SequenceEvent::StateTransition { .. })));
}

#[tokio::test(start_paused = true)]
async fn each_case_programs_enables_and_powers_down() {
    let (orch, sources) = rig(ExactMeter::new(), SequencerConfig::default());
    orch.start().await.unwrap();

    // F1 is bit 0: inactive in even-indexed cases, driven in odd ones
    let f1 = sources[0].calls();
    assert_eq!(f1.len(), 8 * 4 + 2);
    assert_eq!(
        f1[0..4],
        [Call::SetVoltage(0.0), Call::Enable, Call::Disable, Call::SetVoltage(0.0)]
    );
    assert_eq!(
        f1[4..8],
        [Call::SetVoltage(24.0), Call::Enable, Call::Disable, Call::SetVoltage(0.0)]
    );
    // the run ends with one more power-down
    assert_eq!(f1[32..], [Call::Disable, Call::SetVoltage(0.0)]);

    // F3 is bit 2: driven only in cases 5..8
    let f3_setpoints: Vec<f64> = sources[2]
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::SetVoltage(v) if v > 0.0 => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(f3_setpoints, vec![24.0; 4]);
}

#[tokio::test(start_paused = true)]
async fn current_limit_is_programmed_before_voltage() {
    let config = SequencerConfig::builder().current_limit(0.05).build();
    let (orch, sources) = rig(ExactMeter::new(), config);
    orch.start().await.unwrap();

    for source in &sources {
        let calls = source.calls();
        assert_eq!(calls[0], Call::SetCurrentLimit(0.05));
        assert!(matches!(calls[1], Call::SetVoltage(_)));
        let limits = calls
            .iter()
            .filter(|c| matches!(c, Call::SetCurrentLimit(_)))
            .count();
        assert_eq!(limits, 8);
    }
}

#[tokio::test(start_paused = true)]
async fn meter_gets_range_by_magnitude_and_configured_integration() {
    let meter = Arc::new(ExactMeter::new());
    let sources = [FakeSource::new(), FakeSource::new(), FakeSource::new()];
    let config = SequencerConfig::builder()
        .integration(Integration::Nplc10)
        .build();
    let orch = SequenceOrchestrator::new(sources, Arc::clone(&meter), config);
    orch.start().await.unwrap();

    let reads = meter.reads();
    assert_eq!(reads.len(), 8);
    for ((label, range, integration), case) in reads.iter().zip(orch.cases()) {
        assert_eq!(label, case.name());
        assert_eq!(*integration, Integration::Nplc10);
        let expected = if case.expected_voltage() < 1.0 {
            MeterRange::Volts1
        } else {
            MeterRange::Volts10
        };
        assert_eq!(*range, expected);
    }
    // all fuses open: the full 3.3 V supply
    assert_eq!(reads[0].1, MeterRange::Volts10);
}

#[tokio::test(start_paused = true)]
async fn delays_are_applied_between_and_within_cases() {
    let (orch, _) = rig(ExactMeter::new(), SequencerConfig::default());
    let start = tokio::time::Instant::now();
    orch.start().await.unwrap();

    // 8 stabilization delays and 7 pauses; no pause after the last case
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(8 * 100 + 7 * 300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(8 * 100 + 8 * 300), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn readings_outside_window_fail_with_message() {
    let (config, mut rx) = with_channel(SequencerConfig::builder().without_delays());
    let (orch, sources) = rig(ExactMeter::new().offset(0.5), config);

    assert_eq!(orch.start().await.unwrap(), RunOutcome::Completed);

    let results = results(&drain(&mut rx));
    assert_eq!(results.len(), 8);
    for result in &results {
        assert!(!result.passed());
        assert!(!result.is_error());
        assert!(result.message().starts_with("FAIL: expected "), "{}", result.message());
    }
    assert_eq!(
        results[0].message(),
        "FAIL: expected 3.300 V (3.229 to 3.371 V), measured 3.800 V"
    );
    assert_powered_down(&sources);
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_while_running() {
    let (config, mut rx) = with_channel(SequencerConfig::builder());
    let (orch, sources) = rig(ExactMeter::new(), config);

    let run = orch.spawn();
    while !orch.is_running() {
        tokio::task::yield_now().await;
    }
    let before = sources[0].calls().len();
    assert_eq!(orch.start().await.unwrap_err(), SequenceError::AlreadyRunning);
    assert_eq!(sources[0].calls().len(), before);

    assert_eq!(run.await.unwrap().unwrap(), RunOutcome::Completed);
    assert_eq!(results(&drain(&mut rx)).len(), 8);
}

#[tokio::test(start_paused = true)]
async fn orchestrator_can_run_again_after_completion() {
    let (config, mut rx) = with_channel(SequencerConfig::builder().without_delays());
    let (orch, _) = rig(ExactMeter::new(), config);

    orch.start().await.unwrap();
    orch.start().await.unwrap();

    let events = drain(&mut rx);
    assert_eq!(results(&events).len(), 16);
    let transitions: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SequenceEvent::StateTransition { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(transitions[2], (SequenceState::Completed, SequenceState::Running));
}

#[test]
fn case_list_is_available_before_any_run() {
    let (orch, _) = rig(ExactMeter::new(), SequencerConfig::default());
    let cases = orch.cases();
    assert_eq!(cases.len(), 8);
    assert_eq!(cases[0].expected_voltage(), 3.3);
    assert!(cases[1].fuse_states().f1);
    assert!(!cases[1].fuse_states().f2);
    let smallest = cases
        .iter()
        .map(|c| c.expected_voltage())
        .fold(f64::INFINITY, f64::min);
    assert_eq!(cases[7].expected_voltage(), smallest);
}

#[tokio::test(start_paused = true)]
async fn results_serialize_to_json_report() {
    let (config, mut rx) = with_channel(SequencerConfig::builder().name("report"));
    let (orch, _) = rig(ExactMeter::new().offset(0.5), config);
    orch.start().await.unwrap();

    let results = results(&drain(&mut rx));
    let report = serde_json::to_value(&results).unwrap();
    let first = &report[0];

    assert_eq!(first["test_case"]["name"], "Test_01");
    assert_eq!(first["test_case"]["fuse_states"]["f1"], false);
    assert_eq!(first["test_case"]["expected_voltage"], 3.3);
    assert_eq!(first["measured_voltage"], 3.8);
    assert_eq!(first["passed"], false);
    assert!(first["message"].as_str().unwrap().starts_with("FAIL:"));

    let state = serde_json::to_value(orch.state()).unwrap();
    assert_eq!(state, "Completed");
}
