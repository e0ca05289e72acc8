//! Server identities and the two occupancy slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::demand::Demand;

/// One of the two heterogeneous servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerId {
    Fast,
    Slow,
}

impl ServerId {
    /// Both servers in dispatch priority order.
    pub const ALL: [ServerId; 2] = [ServerId::Fast, ServerId::Slow];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            ServerId::Fast => 0,
            ServerId::Slow => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerId::Fast => "fast",
            ServerId::Slow => "slow",
        }
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupancy of the fast and slow server. Each slot holds at most one demand.
#[derive(Debug, Clone, Default)]
pub struct ServerSlots {
    slots: [Option<Demand>; 2],
}

impl ServerSlots {
    #[inline]
    pub fn is_free(&self, server: ServerId) -> bool {
        self.slots[server.index()].is_none()
    }

    pub fn get(&self, server: ServerId) -> Option<&Demand> {
        self.slots[server.index()].as_ref()
    }

    /// Places `demand` into `server`, handing back whatever occupied it before.
    pub(crate) fn occupy(&mut self, server: ServerId, demand: Demand) -> Option<Demand> {
        self.slots[server.index()].replace(demand)
    }

    pub(crate) fn release(&mut self, server: ServerId) -> Option<Demand> {
        self.slots[server.index()].take()
    }

    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
