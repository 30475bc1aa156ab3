//! Cooperative cancellation.
//!
//! A [`CancellationSignal`] is a cheap, cloneable handle shared between the
//! party that requests cancellation (a stop button, a Ctrl-C handler) and the
//! sequence that honors it. The sequence checks the signal at the top of each
//! step and races every delay against it; nothing is interrupted preemptively.

use crate::error::BenchError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// A shared, one-shot cancellation flag.
///
/// Once cancelled, a signal stays cancelled. Create a fresh signal per run.
///
/// # Examples
///
/// ```rust
/// use fusebench_core::CancellationSignal;
/// use std::time::Duration;
///
/// # async fn example() {
/// let signal = CancellationSignal::new();
/// let remote = signal.clone();
///
/// remote.cancel();
/// assert!(signal.is_cancelled());
/// assert!(signal.sleep(Duration::from_secs(10)).await.is_err());
/// # }
/// ```
#[derive(Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationSignal {
    /// Creates a signal that has not been cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns `Err(BenchError::Cancelled)` if cancellation was requested.
    pub fn check(&self) -> Result<(), BenchError> {
        if self.is_cancelled() {
            Err(BenchError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Completes when cancellation is requested.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Sleeps for `duration` unless cancelled first.
    ///
    /// Returns `Err(BenchError::Cancelled)` if the signal fires before (or
    /// while) sleeping.
    pub async fn sleep(&self, duration: Duration) -> Result<(), BenchError> {
        self.check()?;
        tokio::select! {
            biased;

            _ = self.cancelled() => Err(BenchError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
