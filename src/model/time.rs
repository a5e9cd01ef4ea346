//! Time handling for the simulation
//!
//! Key concepts:
//! - SimulationTime: simulated minutes since the last reset
//! - Event: something that happened to an item at a specific simulated time

use serde::Serialize;

use super::item::ItemId;

/// A point in simulated time, measured in minutes.
///
/// Minutes are fractional because the driver feeds real elapsed seconds
/// scaled by the speed multiplier. Every duration drawn for an item is a
/// whole number of minutes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct SimulationTime(pub f64);

impl SimulationTime {
    pub const ZERO: SimulationTime = SimulationTime(0.0);

    pub fn new(minutes: f64) -> Self {
        SimulationTime(minutes)
    }

    pub fn as_minutes(&self) -> f64 {
        self.0
    }

    /// Whole minutes elapsed, for display
    pub fn whole_minutes(&self) -> u64 {
        self.0.max(0.0).floor() as u64
    }

    /// Example: production_start + 70 minutes = production_done
    pub fn add_minutes(&self, minutes: u32) -> SimulationTime {
        SimulationTime(self.0 + f64::from(minutes))
    }

    pub fn advance_by(&self, minutes: f64) -> SimulationTime {
        SimulationTime(self.0 + minutes)
    }

    /// The earlier of two optional times
    pub fn earliest(a: Option<SimulationTime>, b: Option<SimulationTime>) -> Option<SimulationTime> {
        match (a, b) {
            (Some(x), Some(y)) => Some(if y < x { y } else { x }),
            (x, None) => x,
            (None, y) => y,
        }
    }
}

/// What happened to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventType {
    /// WS1 picked up a new item and started producing it
    ItemScheduled { item_id: ItemId },
    /// WS1 finished producing an item
    ProductionComplete { item_id: ItemId },
    /// A produced item left WS1
    TransferStarted { item_id: ItemId },
    /// An item reached the tail of the WS2 queue
    QueuedForWs2 { item_id: ItemId, queue_len: usize },
    /// WS2 took an item from the head of its queue
    ProcessingStarted { item_id: ItemId },
    /// WS2 finished an item
    ProcessingComplete { item_id: ItemId },
}

impl EventType {
    #[cfg(test)]
    pub fn item_id(&self) -> ItemId {
        match *self {
            EventType::ItemScheduled { item_id }
            | EventType::ProductionComplete { item_id }
            | EventType::TransferStarted { item_id }
            | EventType::QueuedForWs2 { item_id, .. }
            | EventType::ProcessingStarted { item_id }
            | EventType::ProcessingComplete { item_id } => item_id,
        }
    }
}

/// An item transition stamped with the simulated time it took effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Event {
    pub time: SimulationTime,
    pub event_type: EventType,
}

impl Event {
    pub fn new(time: SimulationTime, event_type: EventType) -> Self {
        Event { time, event_type }
    }
}
