//! Random durations assigned to each item when WS1 schedules it

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Inclusive range of whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteRange {
    pub min: u32,
    pub max: u32,
}

impl MinuteRange {
    pub const fn new(min: u32, max: u32) -> Self {
        MinuteRange { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    #[cfg(test)]
    pub fn contains(&self, minutes: u32) -> bool {
        (self.min..=self.max).contains(&minutes)
    }
}

/// The four durations drawn once per item, immutable afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemDurations {
    pub production: u32,
    pub setup: u32,
    pub transfer: u32,
    pub processing: u32,
}

/// Ranges each duration is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationRanges {
    pub production: MinuteRange,
    pub setup: MinuteRange,
    pub transfer: MinuteRange,
    pub processing: MinuteRange,
}

impl Default for DurationRanges {
    fn default() -> Self {
        DurationRanges {
            production: MinuteRange::new(65, 85),
            setup: MinuteRange::new(5, 15),
            transfer: MinuteRange::new(5, 11),
            processing: MinuteRange::new(30, 45),
        }
    }
}

impl DurationRanges {
    /// Returns the name of the first range whose bounds are reversed
    pub fn first_invalid(&self) -> Option<&'static str> {
        [
            ("production", self.production),
            ("setup", self.setup),
            ("transfer", self.transfer),
            ("processing", self.processing),
        ]
        .into_iter()
        .find(|(_, range)| !range.is_valid())
        .map(|(name, _)| name)
    }
}

/// Anything that can hand out durations for a new item.
///
/// The simulation only ever calls `draw` from WS1 scheduling, so a scripted
/// implementation is enough to make a run fully reproducible.
pub trait DurationSource {
    fn draw(&mut self) -> ItemDurations;
}

/// Uniform integer draws over `DurationRanges`
pub struct RandomDurations {
    ranges: DurationRanges,
    rng: StdRng,
}

impl RandomDurations {
    /// Seeded streams repeat exactly; without a seed the OS supplies entropy
    pub fn new(ranges: DurationRanges, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomDurations { ranges, rng }
    }
}

impl DurationSource for RandomDurations {
    fn draw(&mut self) -> ItemDurations {
        let r = self.ranges;
        ItemDurations {
            production: self.rng.gen_range(r.production.min..=r.production.max),
            setup: self.rng.gen_range(r.setup.min..=r.setup.max),
            transfer: self.rng.gen_range(r.transfer.min..=r.transfer.max),
            processing: self.rng.gen_range(r.processing.min..=r.processing.max),
        }
    }
}

/// Hands out a fixed script of durations, repeating the last entry forever
#[cfg(test)]
pub(crate) struct ScriptedDurations {
    script: std::collections::VecDeque<ItemDurations>,
    last: ItemDurations,
}

#[cfg(test)]
impl ScriptedDurations {
    pub(crate) fn new(script: Vec<ItemDurations>) -> Self {
        let last = *script.last().expect("script needs at least one entry");
        ScriptedDurations {
            script: script.into(),
            last,
        }
    }

    pub(crate) fn constant(production: u32, setup: u32, transfer: u32, processing: u32) -> Self {
        Self::new(vec![ItemDurations {
            production,
            setup,
            transfer,
            processing,
        }])
    }
}

#[cfg(test)]
impl DurationSource for ScriptedDurations {
    fn draw(&mut self) -> ItemDurations {
        self.script.pop_front().unwrap_or(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_draws_stay_in_range() {
        let ranges = DurationRanges::default();
        let mut source = RandomDurations::new(ranges, Some(7));
        for _ in 0..500 {
            let d = source.draw();
            assert!(ranges.production.contains(d.production));
            assert!(ranges.setup.contains(d.setup));
            assert!(ranges.transfer.contains(d.transfer));
            assert!(ranges.processing.contains(d.processing));
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = RandomDurations::new(DurationRanges::default(), Some(42));
        let mut b = RandomDurations::new(DurationRanges::default(), Some(42));
        for _ in 0..20 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn degenerate_range_always_returns_its_bound() {
        let ranges = DurationRanges {
            production: MinuteRange::new(70, 70),
            ..DurationRanges::default()
        };
        let mut source = RandomDurations::new(ranges, None);
        assert_eq!(source.draw().production, 70);
    }

    #[test]
    fn reversed_range_is_reported() {
        let mut ranges = DurationRanges::default();
        assert_eq!(ranges.first_invalid(), None);
        ranges.transfer = MinuteRange::new(11, 5);
        assert_eq!(ranges.first_invalid(), Some("transfer"));
    }

    #[test]
    fn scripted_source_repeats_last_entry() {
        let first = ItemDurations { production: 1, setup: 2, transfer: 3, processing: 4 };
        let second = ItemDurations { production: 5, setup: 6, transfer: 7, processing: 8 };
        let mut source = ScriptedDurations::new(vec![first, second]);
        assert_eq!(source.draw(), first);
        assert_eq!(source.draw(), second);
        assert_eq!(source.draw(), second);
    }
}
