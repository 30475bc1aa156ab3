//! Safe power-down of the bench.

use crate::config::SequencerConfig;
use crate::dispatch::dispatch;
use crate::events::SequenceEvent;
use fusebench_instrument::{VoltMeter, VoltageSource};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Labels used for the three sources in errors and logs, F1 first.
pub(crate) const SOURCE_LABELS: [&str; 3] = ["source F1", "source F2", "source F3"];

/// Label used for the meter in errors and logs.
pub(crate) const METER_LABEL: &str = "meter";

/// Shared handles to the instruments of one bench.
pub(crate) struct Bench<S, M> {
    pub(crate) sources: [Arc<S>; 3],
    pub(crate) meter: Arc<M>,
}

impl<S, M> Clone for Bench<S, M> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
            meter: Arc::clone(&self.meter),
        }
    }
}

/// Disables and then zeroes every source.
///
/// Errors are never propagated: each one is logged, emitted as
/// [`SequenceEvent::PowerDownFault`], and the remaining steps still run.
/// Returns the number of suppressed errors.
pub(crate) async fn power_down<S, M>(bench: &Bench<S, M>, config: &SequencerConfig) -> usize
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    let timeout = config.instrument_timeout;
    let mut faults = 0;

    for (index, source) in bench.sources.iter().enumerate() {
        let label = SOURCE_LABELS[index];

        let handle = Arc::clone(source);
        let disabled = dispatch(label, "disable", timeout, async move {
            handle.disable().await
        })
        .await;
        if let Err(err) = disabled {
            report(config, index, err.into_bench_error(label));
            faults += 1;
        }

        let handle = Arc::clone(source);
        let zeroed = dispatch(label, "set_voltage", timeout, async move {
            handle.set_voltage(0.0).await
        })
        .await;
        if let Err(err) = zeroed {
            report(config, index, err.into_bench_error(label));
            faults += 1;
        }
    }

    #[cfg(feature = "tracing")]
    debug!(sequence = %config.name, faults, "sources powered down");

    faults
}

fn report(config: &SequencerConfig, source_index: usize, error: fusebench_core::BenchError) {
    #[cfg(feature = "tracing")]
    warn!(
        sequence = %config.name,
        source = SOURCE_LABELS[source_index],
        error = %error,
        "power-down step failed"
    );

    #[cfg(feature = "metrics")]
    counter!("fusebench_power_down_faults_total", "sequence" => config.name.clone())
        .increment(1);

    config.emit(SequenceEvent::PowerDownFault {
        sequence_name: config.name.clone(),
        timestamp: Instant::now(),
        source_index,
        error,
    });
}

/// Powers the bench down when a scope ends.
///
/// The normal path calls [`release`](Self::release), which awaits the
/// power-down. If the guard is dropped while still armed (the owning future
/// was dropped mid-run), a best-effort power-down is spawned on the current
/// runtime instead.
pub(crate) struct PowerDownGuard<S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    armed: Option<(Bench<S, M>, Arc<SequencerConfig>)>,
}

impl<S, M> PowerDownGuard<S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    pub(crate) fn arm(bench: Bench<S, M>, config: Arc<SequencerConfig>) -> Self {
        Self {
            armed: Some((bench, config)),
        }
    }

    /// Powers down now and disarms. Returns the number of suppressed errors.
    pub(crate) async fn release(mut self) -> usize {
        match self.armed.take() {
            Some((bench, config)) => power_down(&bench, &config).await,
            None => 0,
        }
    }
}

impl<S, M> Drop for PowerDownGuard<S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    fn drop(&mut self) {
        let Some((bench, config)) = self.armed.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    power_down(&bench, &config).await;
                });
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                warn!(
                    sequence = %config.name,
                    "no runtime available, sources left in their last state"
                );
            }
        }
    }
}
