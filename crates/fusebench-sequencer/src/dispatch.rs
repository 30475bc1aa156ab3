//! Instrument call dispatch.
//!
//! Every instrument call runs on its own tokio task and is awaited in place,
//! so a blocking or misbehaving driver cannot stall the task that emits
//! events, and a panicking driver surfaces as an error instead of tearing
//! down the sequence.

use crate::error::{CaseError, SequenceError};
use fusebench_core::BenchError;
use std::future::Future;
use std::time::Duration;

/// Runs `call` on a worker task and waits for it.
///
/// With a `timeout`, an overrunning call is reported as
/// [`BenchError::InstrumentFault`] on `instrument`. A panic or abort of the
/// worker becomes [`SequenceError::Dispatch`].
pub(crate) async fn dispatch<T, F>(
    instrument: &'static str,
    operation: &'static str,
    timeout: Option<Duration>,
    call: F,
) -> Result<T, CaseError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, BenchError>> + Send + 'static,
{
    let worker = tokio::spawn(async move {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(BenchError::fault(
                    instrument,
                    format!("{operation} timed out after {limit:?}"),
                )),
            },
            None => call.await,
        }
    });

    match worker.await {
        Ok(result) => result.map_err(CaseError::from),
        Err(join_error) => Err(CaseError::Abort(SequenceError::Dispatch {
            instrument,
            operation,
            message: panic_message(join_error),
        })),
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
