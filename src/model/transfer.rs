//! Moves produced items from WS1 to the WS2 queue
//!
//! Arrival is decided by simulated time (production done + transfer time).
//! The eased position is for drawing only and never gates a transition.

use super::error::SimError;
use super::item::{ItemId, ItemState, ItemStore, Position};
use super::time::{Event, EventType, SimulationTime};
use super::workshop_two::WorkshopTwo;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferLane {
    entry: Position,
    easing: f64,
    snap_distance: f64,
}

impl TransferLane {
    pub fn new(entry: Position, easing: f64, snap_distance: f64) -> Self {
        TransferLane {
            entry,
            easing,
            snap_distance,
        }
    }

    /// Every produced item leaves WS1 immediately
    pub fn begin_transfers(
        &self,
        store: &mut ItemStore,
        now: SimulationTime,
        events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        for item in store.iter_mut() {
            if item.state() == ItemState::Produced && item.timestamps.transfer_done.is_none() {
                item.transition(ItemState::Transferring)?;
                item.target = Some(self.entry);
                events.push(Event::new(now, EventType::TransferStarted { item_id: item.id }));
            }
        }
        Ok(())
    }

    /// Hand items whose transfer time has elapsed to the WS2 queue, earliest arrival first
    pub fn complete_arrivals(
        &self,
        store: &mut ItemStore,
        ws2: &mut WorkshopTwo,
        now: SimulationTime,
        events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        let mut arrived: Vec<(SimulationTime, ItemId)> = store
            .iter()
            .filter(|item| item.state() == ItemState::Transferring)
            .filter_map(|item| item.arrival_due().map(|due| (due, item.id)))
            .filter(|&(due, _)| due <= now)
            .collect();
        arrived.sort_by(|a, b| {
            a.0.as_minutes()
                .total_cmp(&b.0.as_minutes())
                .then(a.1.cmp(&b.1))
        });

        for (due, id) in arrived {
            let item = store.get_mut(id).ok_or(SimError::UnknownItem(id))?;
            item.timestamps.transfer_done = Some(due);
            item.position = self.entry;
            item.target = None;
            item.transition(ItemState::QueuedWs2)?;
            let queue_len = ws2.enqueue(id)?;
            events.push(Event::new(
                due,
                EventType::QueuedForWs2 {
                    item_id: id,
                    queue_len,
                },
            ));
        }
        Ok(())
    }

    /// One animation step for every item still on the lane
    pub fn ease(&self, store: &mut ItemStore) {
        for item in store.iter_mut() {
            if item.state() != ItemState::Transferring {
                continue;
            }
            let Some(target) = item.target else { continue };
            item.position.ease_toward(target, self.easing);
            if item.position.is_near(target, self.snap_distance) {
                item.position = target;
            }
        }
    }

    /// Earliest arrival strictly after `now`
    pub fn next_due(&self, store: &ItemStore, now: SimulationTime) -> Option<SimulationTime> {
        store
            .iter()
            .filter(|item| item.state() == ItemState::Transferring)
            .filter_map(|item| item.arrival_due())
            .filter(|&due| due > now)
            .fold(None, |acc, due| SimulationTime::earliest(acc, Some(due)))
    }
}
