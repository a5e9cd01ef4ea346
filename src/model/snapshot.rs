use serde::Serialize;

use super::item::{Assignment, Item, ItemId, ItemState};
use super::time::SimulationTime;

/// Read-only copy of everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time: SimulationTime,
    pub speed: f64,
    pub running: bool,
    pub paused: bool,
    pub items: Vec<Item>,
    pub ws1_busy_until: SimulationTime,
    pub ws2_busy_until: SimulationTime,
    pub ws2_queue: Vec<ItemId>,
    pub ws2_current: Option<ItemId>,
    pub finished: Vec<ItemId>,
    pub assignments: Vec<Assignment>,
}

impl Snapshot {
    pub fn queue_len(&self) -> usize {
        self.ws2_queue.len()
    }

    /// Items that have left production, whatever happened to them since
    pub fn produced_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.timestamps.production_done.is_some())
            .count()
    }

    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }

    pub fn items_in(&self, state: ItemState) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.state() == state)
    }

    /// The last `n` entries of the assignment log, oldest first
    pub fn recent_assignments(&self, n: usize) -> &[Assignment] {
        let start = self.assignments.len().saturating_sub(n);
        &self.assignments[start..]
    }
}
