//! Two-phase blink generator with a speed knob.
//!
//! Each cycle is `off` milliseconds dark followed by `on` milliseconds lit.
//! Every unit of speed removes 1/16 of the base intervals; negative speed
//! lengthens them.

use crate::config::BlinkerConfig;
use crate::time::{Millis, elapsed};

/// Heartbeat generator for the status LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Blinker {
    base_off_ms: Millis,
    base_on_ms: Millis,
    speed: i32,
    off_ms: Millis,
    on_ms: Millis,
    last_on: Millis,
}

impl Blinker {
    /// Creates a blinker at speed 0 whose first cycle started at time 0.
    ///
    /// # Arguments
    ///
    /// * `config` - Base off and on intervals before speed scaling
    pub fn new(config: BlinkerConfig) -> Self {
        Self {
            base_off_ms: config.off_ms,
            base_on_ms: config.on_ms,
            speed: 0,
            off_ms: config.off_ms,
            on_ms: config.on_ms,
            last_on: 0,
        }
    }

    /// Replaces the base intervals and re-applies the current speed.
    ///
    /// # Arguments
    ///
    /// * `off_ms` - Dark part of the cycle at speed 0
    /// * `on_ms` - Lit part of the cycle at speed 0
    pub fn set_rate(&mut self, off_ms: Millis, on_ms: Millis) {
        self.base_off_ms = off_ms;
        self.base_on_ms = on_ms;
        self.recalculate();
    }

    /// Sets the speed knob. Intervals are only recalculated when it changes.
    pub fn set_speed(&mut self, speed: i32) {
        if self.speed != speed {
            self.speed = speed;
            self.recalculate();
        }
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Current (off, on) intervals after applying speed.
    pub fn intervals(&self) -> (Millis, Millis) {
        (self.off_ms, self.on_ms)
    }

    fn recalculate(&mut self) {
        self.off_ms = scaled(self.base_off_ms, self.speed);
        self.on_ms = scaled(self.base_on_ms, self.speed);
    }

    /// Returns the output level at `now`. Once a full period has passed, the
    /// cycle restarts at `now` and that tick reports off.
    pub fn check_state(&mut self, now: Millis) -> bool {
        let since = elapsed(now, self.last_on);
        if since <= self.off_ms {
            return false;
        }
        if since > self.off_ms.saturating_add(self.on_ms) {
            self.last_on = now;
            return false;
        }
        true
    }
}

fn scaled(base: Millis, speed: i32) -> Millis {
    let shaved = i64::from(base >> 4) * i64::from(speed);
    let value = i64::from(base) - shaved;
    value.clamp(0, i64::from(Millis::MAX)) as Millis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blinker() -> Blinker {
        Blinker::new(BlinkerConfig {
            off_ms: 1000,
            on_ms: 100,
        })
    }

    #[test]
    fn off_then_on_then_repeats() {
        let mut b = blinker();
        assert!(!b.check_state(0));
        assert!(!b.check_state(1000));
        assert!(b.check_state(1001));
        assert!(b.check_state(1100));
        assert!(!b.check_state(1101));
        assert!(!b.check_state(2101));
        assert!(b.check_state(2102));
    }

    #[test]
    fn speed_shaves_sixteenths() {
        let mut b = blinker();
        b.set_speed(8);
        assert_eq!(b.intervals(), (1000 - 62 * 8, 100 - 6 * 8));
        b.set_speed(-4);
        assert_eq!(b.intervals(), (1000 + 62 * 4, 100 + 6 * 4));
    }

    #[test]
    fn intervals_floor_at_zero() {
        let mut b = blinker();
        b.set_speed(100);
        assert_eq!(b.intervals(), (0, 0));
    }

    #[test]
    fn set_rate_keeps_speed() {
        let mut b = blinker();
        b.set_speed(2);
        b.set_rate(320, 32);
        assert_eq!(b.intervals(), (320 - 40, 32 - 4));
    }

    #[test]
    fn cycle_runs_across_counter_wrap() {
        let mut b = blinker();
        let start = Millis::MAX - 500;
        assert!(!b.check_state(start));
        assert!(!b.check_state(start.wrapping_add(1000)));
        assert!(b.check_state(start.wrapping_add(1001)));
        assert!(b.check_state(start.wrapping_add(1100)));
        assert!(!b.check_state(start.wrapping_add(1101)));
        assert!(b.check_state(start.wrapping_add(2102)));
    }

    #[test]
    fn faster_speed_is_observed() {
        let mut b = blinker();
        b.set_speed(8);
        assert!(!b.check_state(504));
        assert!(b.check_state(505));
        assert!(b.check_state(556));
        assert!(!b.check_state(557));
    }
}
