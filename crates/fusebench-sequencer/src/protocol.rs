//! The single-case measurement protocol.

use crate::config::SequencerConfig;
use crate::dispatch::dispatch;
use crate::error::{CaseError, SequenceError};
use crate::power::{Bench, PowerDownGuard, METER_LABEL, SOURCE_LABELS};
use crate::result::TestResult;
use fusebench_circuit::TestCase;
use fusebench_core::CancellationSignal;
use fusebench_instrument::{MeasurementContext, MeterRange, VoltMeter, VoltageSource};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Picks the meter range for an expected voltage.
///
/// Below 1 V the 1 V range, below 10 V the 10 V range, otherwise the largest.
///
/// ```rust
/// use fusebench_instrument::MeterRange;
/// use fusebench_sequencer::select_range;
///
/// assert_eq!(select_range(0.3), MeterRange::Volts1);
/// assert_eq!(select_range(3.3), MeterRange::Volts10);
/// assert_eq!(select_range(10.0), MeterRange::Kilovolts1);
/// ```
pub fn select_range(expected_voltage: f64) -> MeterRange {
    if expected_voltage < 1.0 {
        MeterRange::Volts1
    } else if expected_voltage < 10.0 {
        MeterRange::Volts10
    } else {
        MeterRange::largest()
    }
}

/// Runs one case and always powers the bench down afterwards.
///
/// Instrument errors become an errored [`TestResult`]. Cancellation and
/// dispatch failures leave the case without a result.
pub(crate) async fn execute_case<S, M>(
    bench: &Bench<S, M>,
    config: &Arc<SequencerConfig>,
    case: &TestCase,
    signal: &CancellationSignal,
) -> Result<TestResult, SequenceError>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    let guard = PowerDownGuard::arm(bench.clone(), Arc::clone(config));
    let outcome = measure(bench, config, case, signal).await;
    guard.release().await;

    match outcome {
        Ok(volts) => Ok(TestResult::measured(case.clone(), volts)),
        Err(CaseError::Instrument(err)) => {
            #[cfg(feature = "tracing")]
            warn!(
                sequence = %config.name,
                case = case.name(),
                error = %err,
                "instrument error during case"
            );
            Ok(TestResult::errored(case.clone(), &err))
        }
        Err(CaseError::Abort(err)) => Err(err),
    }
}

/// Programs the sources, waits for the network to settle, and reads the meter.
///
/// The signal is checked before every instrument call; a stop request never
/// lets a later source be programmed or enabled.
async fn measure<S, M>(
    bench: &Bench<S, M>,
    config: &SequencerConfig,
    case: &TestCase,
    signal: &CancellationSignal,
) -> Result<f64, CaseError>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    let timeout = config.instrument_timeout;

    for (index, (source, active)) in bench
        .sources
        .iter()
        .zip(case.fuse_states().iter())
        .enumerate()
    {
        let label = SOURCE_LABELS[index];
        let volts = if active { config.drive_voltage } else { 0.0 };

        if let Some(amps) = config.current_limit {
            signal.check()?;
            let handle = Arc::clone(source);
            dispatch(label, "set_current_limit", timeout, async move {
                handle.set_current_limit(amps).await
            })
            .await?;
        }

        signal.check()?;
        let handle = Arc::clone(source);
        dispatch(label, "set_voltage", timeout, async move {
            handle.set_voltage(volts).await
        })
        .await?;
    }

    for (index, source) in bench.sources.iter().enumerate() {
        signal.check()?;
        let handle = Arc::clone(source);
        dispatch(SOURCE_LABELS[index], "enable", timeout, async move {
            handle.enable().await
        })
        .await?;
    }

    signal.sleep(config.stabilization_delay).await?;

    let expected = case.expected_voltage();
    let range = select_range(expected);
    let integration = config.integration;
    let context = MeasurementContext::new(case.name(), expected);
    let meter = Arc::clone(&bench.meter);

    signal.check()?;
    let volts = dispatch(METER_LABEL, "read_voltage", timeout, async move {
        meter
            .read_voltage(range, integration, Some(&context))
            .await
    })
    .await?;

    #[cfg(feature = "tracing")]
    debug!(
        sequence = %config.name,
        case = case.name(),
        range = %range,
        expected,
        measured = volts,
        "reading taken"
    );

    Ok(volts)
}
