//! The whole two-workshop line behind one owner
//!
//! Every mutation happens in `tick` or in one of the control calls. A tick
//! catches simulated time up to its target one due time at a time, so the
//! outcome does not depend on how finely the driver slices real time.

use super::clock::SimulationClock;
use super::durations::DurationSource;
use super::error::SimError;
use super::item::{ItemStore, Position};
#[cfg(test)]
use super::item::{Assignment, Item, ItemId};
use super::snapshot::Snapshot;
use super::time::{Event, SimulationTime};
use super::transfer::TransferLane;
use super::workshop_one::WorkshopOne;
use super::workshop_two::WorkshopTwo;

/// Fixed parameters of the line, kept across resets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSettings {
    pub initial_speed: f64,
    pub ws1_station: Position,
    pub ws2_entry: Position,
    /// Fraction of the remaining distance covered per tick while transferring
    pub easing: f64,
    pub snap_distance: f64,
}

impl Default for LineSettings {
    fn default() -> Self {
        LineSettings {
            initial_speed: 1.0,
            ws1_station: Position::new(730.0, 250.0),
            ws2_entry: Position::new(1060.0, 255.0),
            easing: 0.05,
            snap_distance: 2.0,
        }
    }
}

pub struct SimulationState {
    settings: LineSettings,
    source: Box<dyn DurationSource>,
    clock: SimulationClock,
    items: ItemStore,
    ws1: WorkshopOne,
    lane: TransferLane,
    ws2: WorkshopTwo,
}

impl SimulationState {
    /// A stopped line at time zero with the first item already in WS1
    pub fn new(settings: LineSettings, source: Box<dyn DurationSource>) -> Result<Self, SimError> {
        let mut state = SimulationState {
            settings,
            source,
            clock: SimulationClock::new(settings.initial_speed)?,
            items: ItemStore::new(),
            ws1: WorkshopOne::new(settings.ws1_station),
            lane: TransferLane::new(settings.ws2_entry, settings.easing, settings.snap_distance),
            ws2: WorkshopTwo::new(),
        };
        state.schedule_first()?;
        Ok(state)
    }

    fn schedule_first(&mut self) -> Result<(), SimError> {
        let now = self.clock.now();
        self.ws1
            .schedule_next(&mut self.items, self.source.as_mut(), now)?;
        Ok(())
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Space bar: starts the line if stopped, otherwise flips pause
    pub fn toggle(&mut self) {
        self.clock.toggle();
    }

    /// Throw away every item and start over, stopped, at time zero.
    /// The duration stream carries on where it was.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.clock = SimulationClock::new(self.settings.initial_speed)?;
        self.items = ItemStore::new();
        self.ws1 = WorkshopOne::new(self.settings.ws1_station);
        self.ws2 = WorkshopTwo::new();
        self.schedule_first()
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), SimError> {
        self.clock.set_speed(speed)
    }

    /// Advance by `elapsed_real_seconds` scaled by the speed multiplier.
    ///
    /// Does nothing while stopped or paused. Returns every transition that
    /// happened, in simulated-time order.
    pub fn tick(&mut self, elapsed_real_seconds: f64) -> Result<Vec<Event>, SimError> {
        let Some(target) = self.clock.target_after(elapsed_real_seconds)? else {
            return Ok(Vec::new());
        };

        let mut events = Vec::new();
        loop {
            let step_to = match self.next_due() {
                Some(due) if due < target => due,
                _ => target,
            };
            self.clock.advance_to(step_to);
            self.run_phases(&mut events)?;
            if step_to >= target {
                break;
            }
        }
        self.lane.ease(&mut self.items);
        Ok(events)
    }

    /// One pass at the current time, in fixed order
    fn run_phases(&mut self, events: &mut Vec<Event>) -> Result<(), SimError> {
        let now = self.clock.now();

        self.ws1.advance_production(&mut self.items, now, events)?;
        self.lane.begin_transfers(&mut self.items, now, events)?;
        self.lane
            .complete_arrivals(&mut self.items, &mut self.ws2, now, events)?;

        if self.ws1.ready_for_next(&self.items, now)? {
            let event = self
                .ws1
                .schedule_next(&mut self.items, self.source.as_mut(), now)?;
            events.push(event);
        }

        self.ws2.complete_current(&mut self.items, now, events)?;
        self.ws2.try_start_next(&mut self.items, now, events)?;
        Ok(())
    }

    /// Earliest pending deadline strictly after the current time
    fn next_due(&self) -> Option<SimulationTime> {
        let now = self.clock.now();
        let ws1 = self.ws1.next_due(&self.items, now);
        let lane = self.lane.next_due(&self.items, now);
        let ws2 = self.ws2.next_due(now);
        SimulationTime::earliest(SimulationTime::earliest(ws1, lane), ws2)
    }

    pub fn now(&self) -> SimulationTime {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.clock.now(),
            speed: self.clock.speed(),
            running: self.clock.is_running(),
            paused: self.clock.is_paused(),
            items: self.items.as_slice().to_vec(),
            ws1_busy_until: self.ws1.busy_until(),
            ws2_busy_until: self.ws2.busy_until(),
            ws2_queue: self.ws2.queue(),
            ws2_current: self.ws2.current(),
            finished: self.ws2.finished().to_vec(),
            assignments: self.ws1.assignments().to_vec(),
        }
    }
}

#[cfg(test)]
impl SimulationState {
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn items(&self) -> &[Item] {
        self.items.as_slice()
    }

    pub fn finished(&self) -> &[ItemId] {
        self.ws2.finished()
    }

    pub fn assignments(&self) -> &[Assignment] {
        self.ws1.assignments()
    }
}
