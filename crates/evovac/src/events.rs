//! Event sinks shared by the spawn and capture pipelines.
//!
//! Producers never hold listeners directly. They receive a `&mut dyn EventSink<E>`
//! for the duration of a call and push events into it; the caller decides whether
//! to drop, collect, forward or fan those events out. [`ChannelSink`] backs the
//! per-tick event bus of [`crate::sim::Simulation`].
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, warn};

/// A generic event sink that accepts events of type `E`.
pub trait EventSink<E> {
    fn send(&mut self, event: E);

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = E>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl<E> EventSink<E> for () {
    #[inline]
    fn send(&mut self, _event: E) {}
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<E, F> EventSink<E> for FnSink<F>
where
    F: FnMut(E),
{
    #[inline]
    fn send(&mut self, event: E) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Debug)]
pub struct VecSink<E> {
    events: Vec<E>,
}

impl<E> Default for VecSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> VecSink<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<E> {
        self.events
    }

    pub fn as_slice(&self) -> &[E] {
        &self.events
    }

    /// Take the collected events, leaving the sink empty.
    pub fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<E> EventSink<E> for VecSink<E> {
    #[inline]
    fn send(&mut self, event: E) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S> {
    pub(crate) sinks: Vec<S>,
}

impl<S> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone, S: EventSink<E>> EventSink<E> for MultiSink<S> {
    fn send(&mut self, event: E) {
        let Some((last, rest)) = self.sinks.split_last_mut() else {
            return;
        };
        for sink in rest {
            sink.send(event.clone());
        }
        last.send(event);
    }
}

/// Sink that pushes events into a crossbeam channel. Any event convertible into
/// the channel's item type is accepted. A disconnected receiver silently drops
/// events; a full bounded channel drops the newest event and counts it.
pub struct ChannelSink<E> {
    pub tx: Sender<E>,
    dropped: Arc<AtomicU64>,
}

impl<E, T: Into<E>> EventSink<T> for ChannelSink<E> {
    #[inline]
    fn send(&mut self, event: T) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event.into()) {
            if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                warn!("Event bus full; dropping events until drained.");
            }
        }
    }
}

/// Event bus: producers write through [`ChannelSink`], the owner drains once per
/// tick. [`EventBus::new`] never drops events, so an owner that stops draining
/// grows it without bound; [`EventBus::bounded`] caps the backlog instead.
pub struct EventBus<E> {
    tx: Sender<E>,
    rx: Receiver<E>,
    dropped: Arc<AtomicU64>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            dropped: Arc::default(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus holding at most `capacity` undrained events. Overflow is dropped.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            tx,
            rx,
            dropped: Arc::default(),
        }
    }

    pub fn sink(&self) -> ChannelSink<E> {
        ChannelSink {
            tx: self.tx.clone(),
            dropped: self.dropped.clone(),
        }
    }

    /// Drain every pending event in arrival order.
    pub fn drain(&self) -> Vec<E> {
        let events: Vec<E> = self.rx.try_iter().collect();
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            debug!("Event bus dropped {} events since last drain.", dropped);
        }
        events
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.rx.capacity()
    }

    /// Events dropped on overflow since the last [`EventBus::drain`].
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
