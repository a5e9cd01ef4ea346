use serde::Serialize;

use super::error::SimError;
use super::time::SimulationTime;

/// Speed multipliers offered by the driver's buttons and number keys
pub const SPEED_PRESETS: [f64; 5] = [1.0, 2.0, 5.0, 10.0, 20.0];

/// Longest span of simulated minutes one tick may catch up (one year)
pub const MAX_TICK_MINUTES: f64 = 525_600.0;

/// Owns simulated time and the run controls.
///
/// One real second of elapsed time becomes `speed` simulated minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationClock {
    now: SimulationTime,
    speed: f64,
    running: bool,
    paused: bool,
}

impl SimulationClock {
    /// A stopped clock at time zero
    pub fn new(speed: f64) -> Result<Self, SimError> {
        validate_speed(speed)?;
        Ok(SimulationClock {
            now: SimulationTime::ZERO,
            speed,
            running: false,
            paused: true,
        })
    }

    pub fn now(&self) -> SimulationTime {
        self.now
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time only moves while running and not paused
    pub fn is_advancing(&self) -> bool {
        self.running && !self.paused
    }

    pub fn start(&mut self) {
        self.running = true;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn toggle(&mut self) {
        self.running = true;
        self.paused = !self.paused;
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), SimError> {
        validate_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Simulated time this tick should reach, or `None` if the clock is held
    pub fn target_after(&self, elapsed_real_seconds: f64) -> Result<Option<SimulationTime>, SimError> {
        if !self.is_advancing() {
            return Ok(None);
        }
        if !elapsed_real_seconds.is_finite() || elapsed_real_seconds < 0.0 {
            return Err(SimError::InvalidElapsed(elapsed_real_seconds));
        }
        let minutes = elapsed_real_seconds * self.speed;
        if !minutes.is_finite() || minutes > MAX_TICK_MINUTES {
            return Err(SimError::InvalidElapsed(elapsed_real_seconds));
        }
        Ok(Some(self.now.advance_by(minutes)))
    }

    /// Never moves backwards
    pub fn advance_to(&mut self, time: SimulationTime) {
        if time > self.now {
            self.now = time;
        }
    }
}

fn validate_speed(speed: f64) -> Result<(), SimError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidSpeed(speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_is_stopped_at_zero() {
        let clock = SimulationClock::new(1.0).unwrap();
        assert_eq!(clock.now(), SimulationTime::ZERO);
        assert!(!clock.is_running());
        assert!(clock.is_paused());
        assert_eq!(clock.target_after(10.0), Ok(None));
    }

    #[test]
    fn controls_follow_button_semantics() {
        let mut clock = SimulationClock::new(1.0).unwrap();
        clock.start();
        assert!(clock.is_advancing());

        clock.pause();
        assert!(clock.is_running());
        assert!(!clock.is_advancing());

        clock.toggle();
        assert!(clock.is_advancing());
        clock.toggle();
        assert!(clock.is_paused());
    }

    #[test]
    fn toggle_from_stopped_starts_running() {
        let mut clock = SimulationClock::new(1.0).unwrap();
        clock.toggle();
        assert!(clock.is_running());
        assert!(!clock.is_paused());
    }

    #[test]
    fn speed_scales_elapsed_time() {
        let mut clock = SimulationClock::new(1.0).unwrap();
        clock.start();
        clock.set_speed(20.0).unwrap();
        assert_eq!(clock.target_after(1.5), Ok(Some(SimulationTime::new(30.0))));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut clock = SimulationClock::new(5.0).unwrap();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(clock.set_speed(bad), Err(SimError::InvalidSpeed(_))));
        }
        assert_eq!(clock.speed(), 5.0);
        assert!(SimulationClock::new(0.0).is_err());
    }

    #[test]
    fn accepts_speeds_outside_presets() {
        let mut clock = SimulationClock::new(1.0).unwrap();
        clock.set_speed(3.5).unwrap();
        assert_eq!(clock.speed(), 3.5);
    }

    #[test]
    fn rejects_negative_elapsed_only_while_advancing() {
        let mut clock = SimulationClock::new(1.0).unwrap();
        assert_eq!(clock.target_after(-1.0), Ok(None));
        clock.start();
        assert_eq!(clock.target_after(-1.0), Err(SimError::InvalidElapsed(-1.0)));
    }

    #[test]
    fn rejects_elapsed_beyond_catch_up_limit() {
        let mut clock = SimulationClock::new(20.0).unwrap();
        clock.start();
        assert_eq!(
            clock.target_after(f64::MAX),
            Err(SimError::InvalidElapsed(f64::MAX))
        );
        let too_long = MAX_TICK_MINUTES / 20.0 + 1.0;
        assert_eq!(clock.target_after(too_long), Err(SimError::InvalidElapsed(too_long)));
        assert_eq!(
            clock.target_after(MAX_TICK_MINUTES / 20.0),
            Ok(Some(SimulationTime::new(MAX_TICK_MINUTES)))
        );
        assert_eq!(clock.now(), SimulationTime::ZERO);
    }

    #[test]
    fn advance_never_moves_backwards() {
        let mut clock = SimulationClock::new(1.0).unwrap();
        clock.advance_to(SimulationTime::new(10.0));
        clock.advance_to(SimulationTime::new(4.0));
        assert_eq!(clock.now(), SimulationTime::new(10.0));
    }
}
