//! Chase animation across a row of LEDs.
//!
//! A cycle is a dark pause of `wait_ms` followed by a light travelling across
//! the LEDs, one `pulse_ms` apart. Each LED's window overlaps its
//! neighbours', giving a comet tail rather than a single hard pixel. The
//! only state is the cycle start.

use crate::config::SliderConfig;
use crate::time::{Millis, elapsed};

/// LED chase animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slider {
    start: Millis,
    wait_ms: Millis,
    pulse_ms: Millis,
    led_count: usize,
    /// LEDs were last written all-off by a restart and nothing has lit since.
    parked: bool,
}

impl Slider {
    /// Creates a parked slider whose first cycle starts at `now`.
    ///
    /// # Arguments
    ///
    /// * `config` - Pause before each sweep and spacing between LEDs
    /// * `led_count` - Number of LEDs in the row
    /// * `now` - Start of the first cycle
    pub fn new(config: SliderConfig, led_count: usize, now: Millis) -> Self {
        Self {
            start: now,
            wait_ms: config.wait_ms,
            pulse_ms: config.pulse_ms,
            led_count,
            parked: true,
        }
    }

    /// Number of LEDs the slider drives.
    pub fn led_count(&self) -> usize {
        self.led_count
    }

    /// Whether every LED was last written dark by a restart.
    pub fn is_parked(&self) -> bool {
        self.parked
    }

    /// Length of one full cycle: the wait plus `led_count + 2` pulses.
    pub fn cycle_ms(&self) -> Millis {
        let pulses = (self.led_count as Millis).saturating_add(2);
        self.wait_ms
            .saturating_add(pulses.saturating_mul(self.pulse_ms))
            .max(1)
    }

    /// Whether `led` is lit at `now`.
    pub fn is_lit(&self, led: usize, now: Millis) -> bool {
        let in_cycle = elapsed(now, self.start) % self.cycle_ms();
        if in_cycle < self.wait_ms {
            return false;
        }
        let in_pulse = in_cycle - self.wait_ms;
        let centre = (led as Millis + 1).saturating_mul(self.pulse_ms);
        let half = self.pulse_ms / 2;
        let from = centre - half;
        let to = centre + self.pulse_ms + half;
        (from..=to).contains(&in_pulse)
    }

    /// Advances the animation and writes every LED through `set_led`.
    ///
    /// `restart` re-anchors the cycle at `now`. If the LEDs are already parked
    /// dark, a restart writes nothing at all.
    pub fn tick(&mut self, restart: bool, now: Millis, mut set_led: impl FnMut(usize, bool)) {
        if restart {
            self.start = now;
            if self.parked {
                return;
            }
            self.parked = true;
        }

        for led in 0..self.led_count {
            let lit = self.is_lit(led, now);
            if lit {
                self.parked = false;
            }
            set_led(led, lit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider() -> Slider {
        Slider::new(
            SliderConfig {
                wait_ms: 3000,
                pulse_ms: 150,
            },
            6,
            0,
        )
    }

    #[test]
    fn dark_during_wait() {
        let s = slider();
        assert_eq!(s.cycle_ms(), 3000 + 8 * 150);
        for now in [0, 1500, 2999] {
            assert!((0..6).all(|led| !s.is_lit(led, now)));
        }
    }

    #[test]
    fn first_led_window() {
        let s = slider();
        assert!(!s.is_lit(0, 3000));
        assert!(!s.is_lit(0, 3074));
        assert!(s.is_lit(0, 3075));
        assert!(s.is_lit(0, 3375));
        assert!(!s.is_lit(0, 3376));
    }

    #[test]
    fn neighbours_overlap() {
        let s = slider();
        // LED 1 opens at 225 into the pulse phase, while LED 0 is still lit.
        assert!(s.is_lit(0, 3300) && s.is_lit(1, 3300));
        assert!(!s.is_lit(2, 3300));
    }

    #[test]
    fn repeats_every_cycle() {
        let s = slider();
        let cycle = s.cycle_ms();
        assert_eq!(s.is_lit(3, 3600), s.is_lit(3, 3600 + cycle));
        assert!(s.is_lit(3, 3600 + 2 * cycle));
    }

    #[test]
    fn restart_while_parked_touches_nothing() {
        let mut s = slider();
        let mut writes = 0;
        s.tick(true, 100, |_, _| writes += 1);
        assert_eq!(writes, 0);
    }

    #[test]
    fn restart_after_lighting_turns_all_off_once() {
        let mut s = slider();
        let mut lit = [false; 6];
        s.tick(false, 3100, |led, on| lit[led] = on);
        assert!(lit[0]);
        assert!(!s.is_parked());

        s.tick(true, 3200, |led, on| lit[led] = on);
        assert_eq!(lit, [false; 6]);
        assert!(s.is_parked());

        let mut writes = 0;
        s.tick(true, 3210, |_, _| writes += 1);
        assert_eq!(writes, 0);
    }

    #[test]
    fn survives_clock_wrap() {
        let s = Slider::new(SliderConfig::default(), 6, u32::MAX - 2999);
        assert!(s.is_lit(0, 100));
    }
}
