//! Consumes sequence events from a channel instead of callbacks.
//!
//! Useful when the consumer lives on another task, e.g. a UI that redraws on
//! every event.

use fusebench::core::BenchEvent;
use fusebench::instrument::sim::{SimulatedVoltMeter, SimulatedVoltageSource};
use fusebench::sequencer::{SequenceEvent, SequenceOrchestrator, SequencerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    let (tx, mut rx) = mpsc::unbounded_channel::<SequenceEvent>();

    let sources = ["V1", "V2", "V3"].map(|name| {
        Arc::new(SimulatedVoltageSource::builder().name(name).build())
    });
    let meter = Arc::new(SimulatedVoltMeter::builder().name("DMM").seed(7).build());

    let config = SequencerConfig::builder()
        .name("channel-demo")
        .stabilization_delay(Duration::from_millis(20))
        .inter_case_pause(Duration::from_millis(50))
        .listener(tx)
        .build();

    let orchestrator = Arc::new(SequenceOrchestrator::new(sources, meter, config));
    let run = orchestrator.spawn();

    // The config holds the only sender; the channel closes when the
    // orchestrator is dropped.
    drop(orchestrator);

    while let Some(event) = rx.recv().await {
        match &event {
            SequenceEvent::StatusChanged { text, .. } => println!("status  {text}"),
            SequenceEvent::TestResultAvailable { result, .. } => {
                println!("result  {} {}", result.name(), result.message())
            }
            SequenceEvent::StateTransition { from, to, .. } => {
                println!("state   {from:?} -> {to:?}")
            }
            SequenceEvent::PowerDownFault {
                source_index,
                error,
                ..
            } => println!("fault   source {source_index}: {error}"),
        }
        println!("        ({} from {})", event.event_type(), event.source_name());
    }

    match run.await {
        Ok(outcome) => println!("{outcome:?}"),
        Err(err) => eprintln!("sequence task failed: {err}"),
    }
}
