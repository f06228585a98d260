//! Autofire oscillator embedded in every button.
//!
//! While the button is held and autofire is enabled, the derived output state
//! toggles every `rate` milliseconds. Otherwise the derived state mirrors the
//! debounced one exactly.

use crate::time::{Millis, elapsed};

/// Bounds and tuning steps for autofire rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutofireLimits {
    /// Rate applied when autofire is switched on or off.
    pub initial_ms: Millis,
    /// Floor for the configured rate and for the toggle period.
    pub min_ms: Millis,
    pub max_ms: Millis,
    /// Adjustment per step, as a percentage of the current rate.
    pub step_percent: u8,
    /// How often a held increase/decrease control applies a step.
    pub adjust_interval_ms: Millis,
}

impl AutofireLimits {
    /// Limits used by both presets: 20 ms initial rate within 10..=2000 ms,
    /// 5 % steps every 100 ms.
    pub const DEFAULT: Self = Self {
        initial_ms: 20,
        min_ms: 10,
        max_ms: 2000,
        step_percent: 5,
        adjust_interval_ms: 100,
    };

    /// Clamps `rate` into `min_ms..=max_ms`.
    pub fn clamp(&self, rate: Millis) -> Millis {
        rate.clamp(self.min_ms, self.max_ms)
    }

    /// One adjustment step for `rate`, never less than 1 ms.
    pub fn step(&self, rate: Millis) -> Millis {
        (rate.saturating_mul(Millis::from(self.step_percent)) / 100).max(1)
    }

    /// Rate one step slower than `rate`, clamped to `max_ms`.
    pub fn increased(&self, rate: Millis) -> Millis {
        self.clamp(rate.saturating_add(self.step(rate)))
    }

    /// Rate one step faster than `rate`, clamped to `min_ms`.
    pub fn decreased(&self, rate: Millis) -> Millis {
        self.clamp(rate.saturating_sub(self.step(rate)))
    }
}

impl Default for AutofireLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-button autofire state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Autofire {
    limits: AutofireLimits,
    enabled: bool,
    rate_ms: Millis,
    pressed: bool,
    changed: bool,
    last_toggle: Millis,
}

impl Autofire {
    /// Creates a disabled oscillator at the initial rate.
    ///
    /// # Arguments
    ///
    /// * `limits` - Rate bounds and tuning steps shared by the whole pad
    pub fn new(limits: AutofireLimits) -> Self {
        Self {
            limits,
            enabled: false,
            rate_ms: limits.clamp(limits.initial_ms),
            pressed: false,
            changed: false,
            last_toggle: 0,
        }
    }

    /// Whether held presses are turned into pulses.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured half-period in milliseconds.
    pub fn rate_ms(&self) -> Millis {
        self.rate_ms
    }

    pub fn limits(&self) -> &AutofireLimits {
        &self.limits
    }

    /// Derived pressed state used for output.
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the derived state flipped on the last update.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Toggle period actually used, floored at the configured minimum.
    pub fn effective_rate(&self) -> Millis {
        self.rate_ms.max(self.limits.min_ms)
    }

    /// Flips autofire on or off and restores the initial rate. Takes effect
    /// from the next update; the derived state is left untouched here.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        self.rate_ms = self.limits.clamp(self.limits.initial_ms);
    }

    /// Switches autofire on or off without touching the rate.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the rate, clamped to the limits.
    pub fn set_rate(&mut self, rate: Millis) {
        self.rate_ms = self.limits.clamp(rate);
    }

    /// Lengthens the period by one step.
    pub fn increase_rate(&mut self) {
        self.rate_ms = self.limits.increased(self.rate_ms);
    }

    /// Shortens the period by one step.
    pub fn decrease_rate(&mut self) {
        self.rate_ms = self.limits.decreased(self.rate_ms);
    }

    /// Advances the oscillator from the button's debounced state.
    pub fn update(&mut self, pressed: bool, changed: bool, now: Millis) {
        if !(self.enabled && pressed) {
            self.pressed = pressed;
            self.changed = changed;
            return;
        }

        if changed {
            self.pressed = true;
            self.changed = true;
            self.last_toggle = now;
            return;
        }

        let period = self.effective_rate();
        let since = elapsed(now, self.last_toggle);
        if since > period {
            self.pressed = !self.pressed;
            self.changed = true;
            // Stay on the toggle grid unless the caller fell a whole period behind.
            self.last_toggle = if since > period.saturating_mul(2) {
                now
            } else {
                self.last_toggle.wrapping_add(period)
            };
        } else {
            self.changed = false;
        }
    }

    /// Drops the derived state to released and marks it changed, so the
    /// output edge agrees with a forced debounced release even mid off-phase.
    /// Returns whether the derived state was pressed.
    pub(crate) fn force_release(&mut self) -> bool {
        let was_pressed = self.pressed;
        self.pressed = false;
        self.changed = true;
        was_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_percentage_with_one_ms_floor() {
        let limits = AutofireLimits::DEFAULT;
        assert_eq!(limits.step(100), 5);
        assert_eq!(limits.step(10), 1);
        assert_eq!(limits.increased(100), 105);
        assert_eq!(limits.decreased(10), 10);
        assert_eq!(limits.increased(1990), 2000);
    }

    #[test]
    fn disabled_mirrors_input() {
        let mut af = Autofire::new(AutofireLimits::DEFAULT);
        af.update(true, true, 0);
        assert!(af.pressed() && af.changed());
        af.update(true, false, 500);
        assert!(af.pressed() && !af.changed());
        af.update(false, true, 501);
        assert!(!af.pressed() && af.changed());
    }

    #[test]
    fn held_button_toggles_on_period_grid() {
        let mut af = Autofire::new(AutofireLimits::DEFAULT);
        af.toggle();
        af.set_rate(50);
        af.update(true, true, 0);
        assert!(af.pressed() && af.changed());

        let mut flips = heapless::Vec::<Millis, 16>::new();
        let mut state = af.pressed();
        for now in 1..=260 {
            af.update(true, false, now);
            if af.changed() {
                assert_ne!(af.pressed(), state, "must alternate");
                state = af.pressed();
                assert!(flips.push(now).is_ok());
            }
        }
        assert_eq!(flips.as_slice(), &[51, 101, 151, 201, 251]);
    }

    #[test]
    fn toggle_restores_initial_rate_without_emitting() {
        let mut af = Autofire::new(AutofireLimits::DEFAULT);
        af.update(true, true, 0);
        af.set_rate(400);
        af.toggle();
        assert!(af.is_enabled());
        assert_eq!(af.rate_ms(), 20);
        assert!(af.pressed());
        assert!(af.changed(), "toggle leaves previous update result alone");
    }

    #[test]
    fn toggle_grid_survives_counter_wrap() {
        let mut af = Autofire::new(AutofireLimits::DEFAULT);
        af.toggle();
        af.set_rate(50);
        let start = Millis::MAX - 60;
        af.update(true, true, start);

        let mut flips = heapless::Vec::<Millis, 8>::new();
        for offset in 1..=160 {
            af.update(true, false, start.wrapping_add(offset));
            if af.changed() {
                assert!(flips.push(offset).is_ok());
            }
        }
        assert_eq!(flips.as_slice(), &[51, 101, 151]);
        assert!(!af.pressed());
    }

    #[test]
    fn force_release_in_off_phase_still_reports_change() {
        let mut af = Autofire::new(AutofireLimits::DEFAULT);
        af.toggle();
        af.update(true, true, 0);
        af.update(true, false, 21);
        af.update(true, false, 22);
        assert!(!af.pressed() && !af.changed());

        assert!(!af.force_release());
        assert!(!af.pressed() && af.changed());
    }

    #[test]
    fn late_tick_resyncs_to_now() {
        let mut af = Autofire::new(AutofireLimits::DEFAULT);
        af.toggle();
        af.update(true, true, 0);
        af.update(true, false, 100);
        assert!(af.changed() && !af.pressed());
        af.update(true, false, 121);
        assert!(af.changed() && af.pressed());
    }
}
