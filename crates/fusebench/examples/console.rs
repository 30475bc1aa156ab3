//! Runs the full sequence against simulated instruments and prints a report.
//!
//! Press Ctrl-C to cancel; the sources are powered down either way.
//! Set `RUST_LOG=fusebench_sequencer=debug` for per-reading logs.

use fusebench::instrument::sim::{SimulatedVoltMeter, SimulatedVoltageSource};
use fusebench::sequencer::{RunOutcome, SequenceOrchestrator, SequencerConfig, TestResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sources = ["V1", "V2", "V3"].map(|name| {
        Arc::new(
            SimulatedVoltageSource::builder()
                .name(name)
                .settle_delay(Duration::from_millis(5))
                .build(),
        )
    });

    // A small fault rate shows how instrument errors surface as failed cases.
    let meter = Arc::new(
        SimulatedVoltMeter::builder()
            .name("DMM")
            .fault_rate(0.05)
            .build(),
    );

    let results: Arc<Mutex<Vec<TestResult>>> = Arc::new(Mutex::new(Vec::new()));
    let collected = Arc::clone(&results);

    let config = SequencerConfig::builder()
        .name("console")
        .current_limit(0.05)
        .on_status(|text| println!("[status] {text}"))
        .on_result(move |result| collected.lock().unwrap().push(result.clone()))
        .on_power_down_fault(|index, err| eprintln!("[power-down] source {index}: {err}"))
        .build();

    let orchestrator = Arc::new(SequenceOrchestrator::new(sources, meter, config));

    println!("Cases:");
    for case in orchestrator.cases() {
        println!(
            "  {}  {}  expected {:.3} V  window [{:.3}, {:.3}] V",
            case.name(),
            case.fuse_states(),
            case.expected_voltage(),
            case.min_voltage(),
            case.max_voltage()
        );
    }
    println!();

    let run = orchestrator.spawn();
    let canceller = Arc::clone(&orchestrator);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let outcome = match run.await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            eprintln!("could not start: {err}");
            return;
        }
        Err(err) => {
            eprintln!("sequence task failed: {err}");
            return;
        }
    };

    println!();
    println!("{:<8} {:>10}  {:<6} Message", "Case", "Measured", "Result");
    let results = results.lock().unwrap();
    for result in results.iter() {
        let measured = result
            .measured_voltage()
            .map_or_else(|| "-".to_string(), |v| format!("{v:.4} V"));
        println!(
            "{:<8} {:>10}  {:<6} {}",
            result.name(),
            measured,
            result.verdict(),
            result.message()
        );
    }

    let passed = results.iter().filter(|r| r.passed()).count();
    println!();
    println!("{passed}/{} passed", results.len());

    match outcome {
        RunOutcome::Completed => println!("Sequence completed"),
        RunOutcome::Cancelled => println!("Sequence cancelled"),
        RunOutcome::Failed { reason } => println!("Sequence failed: {reason}"),
    }
}
