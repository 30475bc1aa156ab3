//! Push-style event delivery from the bench to its observers.
//!
//! A running sequence does not know who is watching: an operator console,
//! a GUI status line, a log sink, a task on the other end of a channel.
//! Each of them registers an [`EventListener`] and receives every event
//! synchronously, in emission order, on the emitting task.

use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Something a bench component reports while it works.
pub trait BenchEvent: Send + Sync + fmt::Debug {
    /// Dotted identifier, `sequence.test_result` for example.
    fn event_type(&self) -> &'static str;

    /// Monotonic time the event was created.
    fn timestamp(&self) -> Instant;

    /// Name of the sequence or instrument that produced the event.
    fn source_name(&self) -> &str;
}

/// Observer of one event type.
///
/// Called on the emitting task; keep it short. Heavy consumers should
/// register an `UnboundedSender` and do their work on their own task.
pub trait EventListener<E: BenchEvent>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// A listener shared between cloned listener sets.
pub type SharedListener<E> = Arc<dyn EventListener<E>>;

/// Ordered set of listeners for one event type.
///
/// Cloning is cheap and shares the listeners themselves.
#[derive(Clone)]
pub struct EventListeners<E: BenchEvent> {
    listeners: Vec<SharedListener<E>>,
}

impl<E: BenchEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers `listener` after the ones already present.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// A panicking listener is skipped over; the rest still see the event.
    /// Returns how many listeners panicked.
    pub fn emit(&self, event: &E) -> usize {
        self.listeners
            .iter()
            .filter(|listener| {
                catch_unwind(AssertUnwindSafe(|| listener.on_event(event))).is_err()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: BenchEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BenchEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListeners({})", self.listeners.len())
    }
}

/// Adapts a closure into an [`EventListener`].
///
/// ```rust
/// # use fusebench_core::{BenchEvent, EventListeners, FnListener};
/// # use std::time::Instant;
/// # #[derive(Debug)]
/// # struct Tick(Instant);
/// # impl BenchEvent for Tick {
/// #     fn event_type(&self) -> &'static str { "tick" }
/// #     fn timestamp(&self) -> Instant { self.0 }
/// #     fn source_name(&self) -> &str { "clock" }
/// # }
/// let mut listeners = EventListeners::new();
/// listeners.add(FnListener::new(|tick: &Tick| println!("{}", tick.event_type())));
/// assert_eq!(listeners.emit(&Tick(Instant::now())), 0);
/// ```
pub struct FnListener<E, F> {
    f: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: BenchEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

/// Channel consumers: every event is cloned into the channel.
///
/// Once the receiver is gone, events are dropped silently.
impl<E> EventListener<E> for tokio::sync::mpsc::UnboundedSender<E>
where
    E: BenchEvent + Clone + 'static,
{
    fn on_event(&self, event: &E) {
        let _ = self.send(event.clone());
    }
}
