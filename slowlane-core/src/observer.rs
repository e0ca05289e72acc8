//! Hook for watching the dispatch loop without touching the engine.

use crate::clock::EventKind;

/// Receives every dispatched event after its handler has run.
pub trait EventObserver {
    fn on_event(&mut self, time: f64, kind: EventKind, queue_length: usize);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EventObserver for NoopObserver {
    #[inline]
    fn on_event(&mut self, _time: f64, _kind: EventKind, _queue_length: usize) {}
}

impl<F> EventObserver for F
where
    F: FnMut(f64, EventKind, usize),
{
    #[inline]
    fn on_event(&mut self, time: f64, kind: EventKind, queue_length: usize) {
        self(time, kind, queue_length)
    }
}
