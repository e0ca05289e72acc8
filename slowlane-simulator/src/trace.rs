//! Observers that fingerprint or record the dispatched event sequence.

use blake3::Hasher;
use slowlane_core::clock::EventKind;
use slowlane_core::observer::EventObserver;

/// Running BLAKE3 digest over `(time, kind, queue length)` of every event.
#[derive(Debug, Clone, Default)]
pub struct TraceHasher {
    hasher: Hasher,
    events: u64,
}

impl TraceHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    /// Hex digest of everything observed so far.
    pub fn finalize_hex(&self) -> String {
        hex::encode(self.hasher.finalize().as_bytes())
    }
}

impl EventObserver for TraceHasher {
    fn on_event(&mut self, time: f64, kind: EventKind, queue_length: usize) {
        self.hasher.update(&time.to_bits().to_le_bytes());
        self.hasher.update(&[kind.tag()]);
        self.hasher.update(&(queue_length as u64).to_le_bytes());
        self.events += 1;
    }
}

/// Keeps every observed event in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceRecorder {
    pub events: Vec<(f64, EventKind, usize)>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.events.iter().map(|(_, kind, _)| *kind)
    }
}

impl EventObserver for TraceRecorder {
    fn on_event(&mut self, time: f64, kind: EventKind, queue_length: usize) {
        self.events.push((time, kind, queue_length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowlane_core::server::ServerId;

    #[test]
    fn digest_depends_on_order() {
        let mut first = TraceHasher::new();
        first.on_event(0.0, EventKind::Arrival, 1);
        first.on_event(0.0, EventKind::ServiceAdmission, 0);

        let mut second = TraceHasher::new();
        second.on_event(0.0, EventKind::ServiceAdmission, 0);
        second.on_event(0.0, EventKind::Arrival, 1);

        assert_ne!(first.finalize_hex(), second.finalize_hex());
        assert_eq!(first.events(), 2);
        assert_eq!(first.finalize_hex().len(), 64);
    }

    #[test]
    fn servers_hash_differently() {
        let mut fast = TraceHasher::new();
        fast.on_event(1.0, EventKind::Departure(ServerId::Fast), 0);
        let mut slow = TraceHasher::new();
        slow.on_event(1.0, EventKind::Departure(ServerId::Slow), 0);
        assert_ne!(fast.finalize_hex(), slow.finalize_hex());
    }

    #[test]
    fn recorder_keeps_events() {
        let mut recorder = TraceRecorder::new();
        assert!(recorder.is_empty());
        recorder.on_event(0.5, EventKind::Arrival, 1);
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.kinds().collect::<Vec<_>>(), vec![EventKind::Arrival]);
    }
}
