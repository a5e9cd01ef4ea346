//! Workshop One - produces one item at a time
//!
//! WS1 stays busy for production + setup after it picks up an item, and it
//! will not pick up another until the last one it scheduled has reached the
//! WS2 side of the line.

use super::durations::DurationSource;
use super::error::SimError;
use super::item::{Assignment, Item, ItemId, ItemState, ItemStore, Position};
use super::time::{Event, EventType, SimulationTime};

#[derive(Debug, Clone)]
pub struct WorkshopOne {
    station: Position,
    busy_until: SimulationTime,
    last_scheduled: Option<ItemId>,
    next_id: ItemId,
    assignments: Vec<Assignment>,
}

impl WorkshopOne {
    pub fn new(station: Position) -> Self {
        WorkshopOne {
            station,
            busy_until: SimulationTime::ZERO,
            last_scheduled: None,
            next_id: 1,
            assignments: Vec::new(),
        }
    }

    pub fn busy_until(&self) -> SimulationTime {
        self.busy_until
    }

    #[cfg(test)]
    pub fn last_scheduled(&self) -> Option<ItemId> {
        self.last_scheduled
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Create the next item and start producing it at `now`
    pub fn schedule_next(
        &mut self,
        store: &mut ItemStore,
        source: &mut dyn DurationSource,
        now: SimulationTime,
    ) -> Result<Event, SimError> {
        let durations = source.draw();
        let id = self.next_id;
        self.next_id += 1;

        let mut item = Item::new(id, durations, self.station);
        item.transition(ItemState::ProducingWs1)?;
        item.timestamps.production_start = Some(now);
        store.push(item);

        self.assignments.push(Assignment::for_item(id, &durations));
        self.busy_until = now.add_minutes(durations.production + durations.setup);
        self.last_scheduled = Some(id);

        Ok(Event::new(now, EventType::ItemScheduled { item_id: id }))
    }

    /// Busy time has elapsed and the previous item is out of WS1's hands
    pub fn ready_for_next(&self, store: &ItemStore, now: SimulationTime) -> Result<bool, SimError> {
        if now < self.busy_until {
            return Ok(false);
        }
        let Some(id) = self.last_scheduled else {
            return Ok(true);
        };
        let last = store.get(id).ok_or(SimError::UnknownItem(id))?;
        Ok(matches!(
            last.state(),
            ItemState::Produced | ItemState::QueuedWs2 | ItemState::ProcessingWs2 | ItemState::Finished
        ))
    }

    /// Mark items whose production time has elapsed as produced
    pub fn advance_production(
        &self,
        store: &mut ItemStore,
        now: SimulationTime,
        events: &mut Vec<Event>,
    ) -> Result<(), SimError> {
        for item in store.iter_mut() {
            if item.state() != ItemState::ProducingWs1 || item.timestamps.production_done.is_some() {
                continue;
            }
            let Some(due) = item.production_due() else { continue };
            if now >= due {
                item.timestamps.production_done = Some(due);
                item.transition(ItemState::Produced)?;
                events.push(Event::new(due, EventType::ProductionComplete { item_id: item.id }));
            }
        }
        Ok(())
    }

    /// Earliest WS1 deadline strictly after `now`
    pub fn next_due(&self, store: &ItemStore, now: SimulationTime) -> Option<SimulationTime> {
        let production = store
            .iter()
            .filter(|item| item.state() == ItemState::ProducingWs1)
            .filter_map(Item::production_due)
            .filter(|&due| due > now)
            .fold(None, |acc, due| SimulationTime::earliest(acc, Some(due)));
        let busy = Some(self.busy_until).filter(|&t| t > now);
        SimulationTime::earliest(production, busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::durations::ScriptedDurations;

    fn t(minutes: f64) -> SimulationTime {
        SimulationTime::new(minutes)
    }

    #[test]
    fn schedule_next_starts_production_and_logs_assignment() {
        let mut ws1 = WorkshopOne::new(Position::new(10.0, 20.0));
        let mut store = ItemStore::new();
        let mut source = ScriptedDurations::constant(70, 10, 8, 40);

        let event = ws1.schedule_next(&mut store, &mut source, t(3.0)).unwrap();
        assert_eq!(event, Event::new(t(3.0), EventType::ItemScheduled { item_id: 1 }));

        let item = store.get(1).unwrap();
        assert_eq!(item.state(), ItemState::ProducingWs1);
        assert_eq!(item.timestamps.production_start, Some(t(3.0)));
        assert_eq!(item.position, Position::new(10.0, 20.0));
        assert_eq!(ws1.busy_until(), t(83.0));
        assert_eq!(ws1.last_scheduled(), Some(1));
        assert_eq!(
            ws1.assignments(),
            &[Assignment { id: 1, production: 70, transfer: 8, processing: 40 }]
        );
    }

    #[test]
    fn ids_increase_and_are_never_reused() {
        let mut ws1 = WorkshopOne::new(Position::default());
        let mut store = ItemStore::new();
        let mut source = ScriptedDurations::constant(70, 10, 8, 40);
        for _ in 0..3 {
            ws1.schedule_next(&mut store, &mut source, t(0.0)).unwrap();
        }
        let ids: Vec<ItemId> = store.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn not_ready_while_busy_or_last_item_still_in_ws1() {
        let mut ws1 = WorkshopOne::new(Position::default());
        let mut store = ItemStore::new();
        let mut source = ScriptedDurations::constant(70, 10, 8, 40);
        assert!(ws1.ready_for_next(&store, t(0.0)).unwrap());

        ws1.schedule_next(&mut store, &mut source, t(0.0)).unwrap();
        assert!(!ws1.ready_for_next(&store, t(79.0)).unwrap());
        // busy time over but item 1 is still producing
        assert!(!ws1.ready_for_next(&store, t(80.0)).unwrap());

        let item = store.get_mut(1).unwrap();
        item.transition(ItemState::Produced).unwrap();
        assert!(ws1.ready_for_next(&store, t(80.0)).unwrap());

        item_to(&mut store, 1, ItemState::Transferring);
        assert!(!ws1.ready_for_next(&store, t(80.0)).unwrap());
        item_to(&mut store, 1, ItemState::QueuedWs2);
        assert!(ws1.ready_for_next(&store, t(80.0)).unwrap());
    }

    fn item_to(store: &mut ItemStore, id: ItemId, state: ItemState) {
        store.get_mut(id).unwrap().transition(state).unwrap();
    }

    #[test]
    fn production_completes_at_exact_due_time() {
        let mut ws1 = WorkshopOne::new(Position::default());
        let mut store = ItemStore::new();
        let mut source = ScriptedDurations::constant(70, 10, 8, 40);
        ws1.schedule_next(&mut store, &mut source, t(0.0)).unwrap();

        let mut events = Vec::new();
        ws1.advance_production(&mut store, t(69.5), &mut events).unwrap();
        assert!(events.is_empty());

        ws1.advance_production(&mut store, t(90.0), &mut events).unwrap();
        let item = store.get(1).unwrap();
        assert_eq!(item.state(), ItemState::Produced);
        assert_eq!(item.timestamps.production_done, Some(t(70.0)));
        assert_eq!(
            events,
            vec![Event::new(t(70.0), EventType::ProductionComplete { item_id: 1 })]
        );
    }

    #[test]
    fn next_due_picks_earliest_future_deadline() {
        let mut ws1 = WorkshopOne::new(Position::default());
        let mut store = ItemStore::new();
        let mut source = ScriptedDurations::constant(70, 10, 8, 40);
        ws1.schedule_next(&mut store, &mut source, t(0.0)).unwrap();

        assert_eq!(ws1.next_due(&store, t(0.0)), Some(t(70.0)));
        assert_eq!(ws1.next_due(&store, t(70.0)), Some(t(80.0)));
        assert_eq!(ws1.next_due(&store, t(80.0)), None);
    }

    #[test]
    fn missing_last_item_is_reported() {
        let mut ws1 = WorkshopOne::new(Position::default());
        ws1.last_scheduled = Some(9);
        assert_eq!(
            ws1.ready_for_next(&ItemStore::new(), t(0.0)),
            Err(SimError::UnknownItem(9))
        );
    }
}
