//! ## slowlane-core::clock
//! **Event clock with one timestamp per pending event type**
//!
//! There are exactly four kinds of pending events, so the clock keeps four
//! timestamps instead of a heap. `f64::INFINITY` means "nothing pending".
//! Each call to [`EventClock::advance`] moves time to the earliest timestamp
//! and reports which event fires, breaking exact ties in the fixed order
//! arrival, service admission, fast departure, slow departure.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::server::ServerId;

/// Sentinel for an event type with nothing scheduled.
pub const NEVER: f64 = f64::INFINITY;

/// The event selected by one iteration of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Arrival,
    ServiceAdmission,
    Departure(ServerId),
}

impl EventKind {
    /// Stable one-byte tag, used when digesting event traces.
    pub fn tag(self) -> u8 {
        match self {
            EventKind::Arrival => 0,
            EventKind::ServiceAdmission => 1,
            EventKind::Departure(ServerId::Fast) => 2,
            EventKind::Departure(ServerId::Slow) => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventClock {
    now: f64,
    next_arrival: f64,
    next_admission: f64,
    next_departure: [f64; 2],
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new()
    }
}

impl EventClock {
    /// Time zero, first arrival due immediately, everything else idle.
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_arrival: 0.0,
            next_admission: NEVER,
            next_departure: [NEVER; 2],
        }
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    #[inline]
    pub fn next_arrival(&self) -> f64 {
        self.next_arrival
    }

    #[inline]
    pub fn next_admission(&self) -> f64 {
        self.next_admission
    }

    #[inline]
    pub fn next_departure(&self, server: ServerId) -> f64 {
        self.next_departure[server.index()]
    }

    /// Pushes the next arrival `gap` time units past the previous one.
    pub(crate) fn delay_arrival(&mut self, gap: f64) {
        self.next_arrival += gap;
    }

    /// Requests a service admission attempt at the current time.
    pub(crate) fn arm_admission(&mut self) {
        self.next_admission = self.now;
    }

    pub(crate) fn clear_admission(&mut self) {
        self.next_admission = NEVER;
    }

    pub(crate) fn schedule_departure(&mut self, server: ServerId, at: f64) {
        self.next_departure[server.index()] = at;
    }

    pub(crate) fn clear_departure(&mut self, server: ServerId) {
        self.next_departure[server.index()] = NEVER;
    }

    /// Advances to the earliest pending event and returns its kind.
    ///
    /// Fails with [`SimulationError::UnreachableState`] when the minimum is not
    /// finite or matches none of the four candidates.
    pub fn advance(&mut self) -> Result<EventKind, SimulationError> {
        let next = self
            .next_arrival
            .min(self.next_admission)
            .min(self.next_departure[ServerId::Fast.index()])
            .min(self.next_departure[ServerId::Slow.index()]);

        if !next.is_finite() || next < self.now {
            return Err(SimulationError::UnreachableState { time: self.now });
        }

        let kind = if next == self.next_arrival {
            EventKind::Arrival
        } else if next == self.next_admission {
            EventKind::ServiceAdmission
        } else if next == self.next_departure[ServerId::Fast.index()] {
            EventKind::Departure(ServerId::Fast)
        } else if next == self.next_departure[ServerId::Slow.index()] {
            EventKind::Departure(ServerId::Slow)
        } else {
            return Err(SimulationError::UnreachableState { time: next });
        };

        self.now = next;
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_initial_value() {
        let clock = EventClock::new();
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.next_arrival(), 0.0);
        assert_eq!(clock.next_admission(), NEVER);
        assert_eq!(clock.next_departure(ServerId::Fast), NEVER);
        assert_eq!(clock.next_departure(ServerId::Slow), NEVER);
    }

    #[test]
    fn test_clock_advance() {
        let mut clock = EventClock::new();
        assert_eq!(clock.advance(), Ok(EventKind::Arrival));
        clock.delay_arrival(5.0);
        clock.schedule_departure(ServerId::Slow, 2.5);

        assert_eq!(clock.advance(), Ok(EventKind::Departure(ServerId::Slow)));
        assert_eq!(clock.now(), 2.5);
        clock.clear_departure(ServerId::Slow);

        assert_eq!(clock.advance(), Ok(EventKind::Arrival));
        assert_eq!(clock.now(), 5.0);
    }

    #[test]
    fn test_tie_break_order() {
        let mut clock = EventClock::new();
        clock.now = 1.0;
        clock.next_arrival = 3.0;
        clock.next_admission = 3.0;
        clock.next_departure = [3.0, 3.0];

        assert_eq!(clock.advance(), Ok(EventKind::Arrival));
        clock.delay_arrival(1.0);
        assert_eq!(clock.advance(), Ok(EventKind::ServiceAdmission));
        clock.clear_admission();
        assert_eq!(clock.advance(), Ok(EventKind::Departure(ServerId::Fast)));
        clock.clear_departure(ServerId::Fast);
        assert_eq!(clock.advance(), Ok(EventKind::Departure(ServerId::Slow)));
        clock.clear_departure(ServerId::Slow);
        assert_eq!(clock.advance(), Ok(EventKind::Arrival));
        assert_eq!(clock.now(), 4.0);
    }

    #[test]
    fn test_admission_is_armed_at_now() {
        let mut clock = EventClock::new();
        clock.delay_arrival(10.0);
        clock.schedule_departure(ServerId::Fast, 4.0);
        clock.advance().unwrap();
        clock.arm_admission();
        assert_eq!(clock.next_admission(), 4.0);
    }

    #[test]
    fn test_nothing_pending_is_unreachable() {
        let mut clock = EventClock::new();
        clock.next_arrival = NEVER;
        assert_eq!(
            clock.advance(),
            Err(SimulationError::UnreachableState { time: 0.0 })
        );
    }

    #[test]
    fn test_nan_timestamp_is_unreachable() {
        let mut clock = EventClock::new();
        clock.next_arrival = f64::NAN;
        assert!(matches!(
            clock.advance(),
            Err(SimulationError::UnreachableState { .. })
        ));
    }

    #[test]
    fn test_event_tags_are_distinct() {
        let kinds = [
            EventKind::Arrival,
            EventKind::ServiceAdmission,
            EventKind::Departure(ServerId::Fast),
            EventKind::Departure(ServerId::Slow),
        ];
        let tags: Vec<u8> = kinds.iter().map(|k| k.tag()).collect();
        assert_eq!(tags, vec![0, 1, 2, 3]);
    }
}
