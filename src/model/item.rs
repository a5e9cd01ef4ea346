use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::durations::ItemDurations;
use super::error::SimError;
use super::time::SimulationTime;

pub type ItemId = u32;

/// Lifecycle of an item, in the only order it may be traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    WaitingWs1,
    ProducingWs1,
    Produced,
    Transferring,
    QueuedWs2,
    ProcessingWs2,
    Finished,
}

impl ItemState {
    pub fn successor(self) -> Option<ItemState> {
        match self {
            ItemState::WaitingWs1 => Some(ItemState::ProducingWs1),
            ItemState::ProducingWs1 => Some(ItemState::Produced),
            ItemState::Produced => Some(ItemState::Transferring),
            ItemState::Transferring => Some(ItemState::QueuedWs2),
            ItemState::QueuedWs2 => Some(ItemState::ProcessingWs2),
            ItemState::ProcessingWs2 => Some(ItemState::Finished),
            ItemState::Finished => None,
        }
    }

    /// Position in the lifecycle, 0 for `WaitingWs1`
    #[cfg(test)]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemState::WaitingWs1 => "waiting_ws1",
            ItemState::ProducingWs1 => "producing_ws1",
            ItemState::Produced => "produced",
            ItemState::Transferring => "transferring",
            ItemState::QueuedWs2 => "queued_ws2",
            ItemState::ProcessingWs2 => "processing_ws2",
            ItemState::Finished => "finished",
        }
    }
}

/// A point on the line layout, in screen units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Move `factor` of the remaining distance toward `target`
    pub fn ease_toward(&mut self, target: Position, factor: f64) {
        self.x += (target.x - self.x) * factor;
        self.y += (target.y - self.y) * factor;
    }

    /// Both axis distances are strictly below `threshold`
    pub fn is_near(&self, target: Position, threshold: f64) -> bool {
        (self.x - target.x).abs() < threshold && (self.y - target.y).abs() < threshold
    }
}

/// Simulated times at which an item passed each milestone
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Timestamps {
    pub production_start: Option<SimulationTime>,
    pub production_done: Option<SimulationTime>,
    pub transfer_done: Option<SimulationTime>,
    pub processing_start: Option<SimulationTime>,
    pub processing_done: Option<SimulationTime>,
}

/// One unit moving through the line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub durations: ItemDurations,
    pub timestamps: Timestamps,
    pub position: Position,
    /// Where the item is heading while transferring
    pub target: Option<Position>,
    state: ItemState,
}

impl Item {
    pub fn new(id: ItemId, durations: ItemDurations, position: Position) -> Self {
        Item {
            id,
            durations,
            timestamps: Timestamps::default(),
            position,
            target: None,
            state: ItemState::WaitingWs1,
        }
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    /// Move to `to`, which must be the successor of the current state
    pub fn transition(&mut self, to: ItemState) -> Result<(), SimError> {
        if self.state.successor() != Some(to) {
            return Err(SimError::IllegalTransition {
                id: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// When production ends, once it has started
    pub fn production_due(&self) -> Option<SimulationTime> {
        self.timestamps
            .production_start
            .map(|start| start.add_minutes(self.durations.production))
    }

    /// When the transfer to WS2 ends, once production is done
    pub fn arrival_due(&self) -> Option<SimulationTime> {
        self.timestamps
            .production_done
            .map(|done| done.add_minutes(self.durations.transfer))
    }
}

/// Entry of the assignment log: the durations drawn for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub id: ItemId,
    pub production: u32,
    pub transfer: u32,
    pub processing: u32,
}

impl Assignment {
    pub fn for_item(id: ItemId, durations: &ItemDurations) -> Self {
        Assignment {
            id,
            production: durations.production,
            transfer: durations.transfer,
            processing: durations.processing,
        }
    }
}

/// All items created since the last reset, in id order, with O(1) lookup
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemStore {
    pub fn new() -> Self {
        ItemStore::default()
    }

    pub fn push(&mut self, item: Item) {
        self.index.insert(item.id, self.items.len());
        self.items.push(item);
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.index.get(&id).map(|&idx| &self.items[idx])
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        match self.index.get(&id) {
            Some(&idx) => self.items.get_mut(idx),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
