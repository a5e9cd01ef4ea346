//! Workshop Two - processes queued items one at a time, first in first out

use std::collections::VecDeque;

use super::error::SimError;
use super::item::{ItemId, ItemState, ItemStore};
use super::time::{Event, EventType, SimulationTime};

#[derive(Debug, Clone, Default)]
pub struct WorkshopTwo {
    queue: VecDeque<ItemId>,
    current: Option<ItemId>,
    busy_until: SimulationTime,
    finished: Vec<ItemId>,
}

impl WorkshopTwo {
    pub fn new() -> Self {
        WorkshopTwo::default()
    }

    /// Ids waiting for WS2, head first
    pub fn queue(&self) -> Vec<ItemId> {
        self.queue.iter().copied().collect()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn current(&self) -> Option<ItemId> {
        self.current
    }

    pub fn busy_until(&self) -> SimulationTime {
        self.busy_until
    }

    /// Ids in completion order
    pub fn finished(&self) -> &[ItemId] {
        &self.finished
    }

    /// Append to the tail; returns the new queue length
    pub fn enqueue(&mut self, id: ItemId) -> Result<usize, SimError> {
        if self.queue.contains(&id) || self.current == Some(id) {
            return Err(SimError::InconsistentQueueState(id));
        }
        self.queue.push_back(id);
        Ok(self.queue.len())
    }

    /// Finish the current item once its processing time has elapsed
    pub fn complete_current(
        &mut self,
        store: &mut ItemStore,
        now: SimulationTime,
        events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        let Some(id) = self.current else { return Ok(()) };
        if now < self.busy_until {
            return Ok(());
        }
        let item = store.get_mut(id).ok_or(SimError::UnknownItem(id))?;
        item.timestamps.processing_done = Some(self.busy_until);
        item.transition(ItemState::Finished)?;
        self.finished.push(id);
        self.current = None;
        events.push(Event::new(
            self.busy_until,
            EventType::ProcessingComplete { item_id: id },
        ));
        Ok(())
    }

    /// Take the queue head if WS2 is idle
    pub fn try_start_next(
        &mut self,
        store: &mut ItemStore,
        now: SimulationTime,
        events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        if self.current.is_some() {
            return Ok(());
        }
        let Some(id) = self.queue.pop_front() else { return Ok(()) };
        let item = store
            .get_mut(id)
            .ok_or(SimError::InconsistentQueueState(id))?;
        if item.state() != ItemState::QueuedWs2 {
            return Err(SimError::InconsistentQueueState(id));
        }
        item.timestamps.processing_start = Some(now);
        item.transition(ItemState::ProcessingWs2)?;
        self.current = Some(id);
        self.busy_until = now.add_minutes(item.durations.processing);
        events.push(Event::new(now, EventType::ProcessingStarted { item_id: id }));
        Ok(())
    }

    /// Completion time of the current item, if it lies after `now`
    pub fn next_due(&self, now: SimulationTime) -> Option<SimulationTime> {
        self.current
            .map(|_| self.busy_until)
            .filter(|&t| t > now)
    }
}
