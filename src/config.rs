//! Declarative controller configuration.
//!
//! One [`GamepadConfig`] describes a hardware revision: which line each
//! control sits on, which HID codes it reports, which LED belongs to it and
//! how the animators are timed. It is built and validated once at startup.

use heapless::Vec;

use crate::autofire::AutofireLimits;
use crate::button::{ButtonId, MAX_BUTTONS};
use crate::direction::{DirectionMode, DpadLine};
use crate::error::ConfigError;
use crate::io::LineId;
use crate::time::Millis;

/// Static description of one button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    pub line: LineId,
    /// HID button number (1-based).
    pub code: u8,
    /// Code reported while the menu control is held as a shift key.
    pub alt_code: Option<u8>,
    pub led: Option<LineId>,
}

impl ButtonConfig {
    /// A button on `line` reporting HID `code`, with no alternate code or LED.
    pub const fn new(line: LineId, code: u8) -> Self {
        Self {
            line,
            code,
            alt_code: None,
            led: None,
        }
    }

    /// Sets the code sent while the menu control is held as shift.
    pub const fn with_alt(mut self, alt_code: u8) -> Self {
        self.alt_code = Some(alt_code);
        self
    }

    /// Attaches an LED output line.
    pub const fn with_led(mut self, led: LineId) -> Self {
        self.led = Some(led);
        self
    }
}

/// Lines of the four D-pad contacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DpadConfig {
    pub up: LineId,
    pub right: LineId,
    pub down: LineId,
    pub left: LineId,
}

impl DpadConfig {
    pub const fn line(&self, which: DpadLine) -> LineId {
        match which {
            DpadLine::Up => self.up,
            DpadLine::Right => self.right,
            DpadLine::Down => self.down,
            DpadLine::Left => self.left,
        }
    }

    /// All four lines in UP, RIGHT, DOWN, LEFT order.
    pub const fn lines(&self) -> [LineId; 4] {
        [self.up, self.right, self.down, self.left]
    }
}

/// A control used to tune the autofire rate while configuring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    Dpad(DpadLine),
    Button(ButtonId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SliderConfig {
    /// Dark pause at the start of every cycle.
    pub wait_ms: Millis,
    /// Spacing between neighbouring LEDs.
    pub pulse_ms: Millis,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            wait_ms: 3000,
            pulse_ms: 150,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkerConfig {
    pub off_ms: Millis,
    pub on_ms: Millis,
}

impl Default for BlinkerConfig {
    fn default() -> Self {
        Self {
            off_ms: 1000,
            on_ms: 100,
        }
    }
}

/// Complete, validated controller description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    buttons: Vec<ButtonConfig, MAX_BUTTONS>,
    dpad: DpadConfig,
    menu: LineId,
    increase: Control,
    decrease: Control,
    status_led: Option<LineId>,
    direction_mode: DirectionMode,
    autofire: AutofireLimits,
    slider: SliderConfig,
    blinker: BlinkerConfig,
}

impl GamepadConfig {
    /// Starts a [`Builder`]; same as [`Builder::new`].
    pub fn builder(dpad: DpadConfig, menu: LineId) -> Builder {
        Builder::new(dpad, menu)
    }

    /// Buttons in [`ButtonId`] order.
    pub fn buttons(&self) -> &[ButtonConfig] {
        &self.buttons
    }

    pub fn dpad(&self) -> &DpadConfig {
        &self.dpad
    }

    /// Input line of the menu control.
    pub fn menu(&self) -> LineId {
        self.menu
    }

    /// Control that lengthens the autofire period while configuring.
    pub fn increase(&self) -> Control {
        self.increase
    }

    /// Control that shortens the autofire period while configuring.
    pub fn decrease(&self) -> Control {
        self.decrease
    }

    /// Output line of the status LED, if any.
    pub fn status_led(&self) -> Option<LineId> {
        self.status_led
    }

    pub fn direction_mode(&self) -> DirectionMode {
        self.direction_mode
    }

    /// Autofire bounds applied to every button.
    pub fn autofire(&self) -> &AutofireLimits {
        &self.autofire
    }

    pub fn slider(&self) -> &SliderConfig {
        &self.slider
    }

    pub fn blinker(&self) -> &BlinkerConfig {
        &self.blinker
    }

    /// Whether `id` is bound to a rate control and so never selectable.
    pub fn is_rate_control(&self, id: ButtonId) -> bool {
        self.increase == Control::Button(id) || self.decrease == Control::Button(id)
    }

    /// LEDs of the buttons that have one, in button order.
    pub fn button_leds(&self) -> impl Iterator<Item = LineId> + '_ {
        self.buttons.iter().filter_map(|b| b.led)
    }

    /// Every input line as a bit mask, for arming wake sources.
    pub fn input_line_mask(&self) -> u64 {
        self.input_lines()
            .filter(|line| line.index() < 64)
            .fold(0, |mask, line| mask | (1u64 << line.index()))
    }

    fn input_lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.buttons
            .iter()
            .map(|b| b.line)
            .chain(self.dpad.lines())
            .chain(core::iter::once(self.menu))
    }

    /// Early two-button revision: no per-button LEDs, one status LED.
    pub fn two_button() -> Self {
        let dpad = DpadConfig {
            up: LineId(2),
            right: LineId(3),
            down: LineId(4),
            left: LineId(5),
        };
        Self {
            buttons: Vec::from_slice(&[
                ButtonConfig::new(LineId(0), 1),
                ButtonConfig::new(LineId(1), 2),
            ])
            .unwrap_or_default(),
            dpad,
            menu: LineId(6),
            increase: Control::Dpad(DpadLine::Up),
            decrease: Control::Dpad(DpadLine::Down),
            status_led: Some(LineId(0)),
            direction_mode: DirectionMode::Hat,
            autofire: AutofireLimits::DEFAULT,
            slider: SliderConfig::default(),
            blinker: BlinkerConfig::default(),
        }
    }

    /// Six face/shoulder buttons with LEDs, SELECT, START and MENU.
    ///
    /// Inputs: A..R on lines 0-5, SELECT 6, START 7, D-pad 8-11 (U, R, D, L),
    /// MENU 12. Outputs: button LEDs 0-5, status LED 6.
    pub fn arcade() -> Self {
        let buttons = [
            ButtonConfig::new(LineId(0), 1).with_alt(9).with_led(LineId(0)),
            ButtonConfig::new(LineId(1), 2).with_alt(10).with_led(LineId(1)),
            ButtonConfig::new(LineId(2), 3).with_alt(11).with_led(LineId(2)),
            ButtonConfig::new(LineId(3), 4).with_alt(12).with_led(LineId(3)),
            ButtonConfig::new(LineId(4), 5).with_led(LineId(4)),
            ButtonConfig::new(LineId(5), 6).with_led(LineId(5)),
            ButtonConfig::new(LineId(6), 7).with_alt(13),
            ButtonConfig::new(LineId(7), 8).with_alt(14),
        ];
        Self {
            buttons: Vec::from_slice(&buttons).unwrap_or_default(),
            dpad: DpadConfig {
                up: LineId(8),
                right: LineId(9),
                down: LineId(10),
                left: LineId(11),
            },
            menu: LineId(12),
            increase: Control::Dpad(DpadLine::Up),
            decrease: Control::Dpad(DpadLine::Down),
            status_led: Some(LineId(6)),
            direction_mode: DirectionMode::Hat,
            autofire: AutofireLimits::DEFAULT,
            slider: SliderConfig::default(),
            blinker: BlinkerConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for button in &self.buttons {
            if button.code == 0 {
                return Err(ConfigError::InvalidButtonCode(button.code));
            }
            if button.alt_code == Some(0) {
                return Err(ConfigError::InvalidButtonCode(0));
            }
        }

        let mut seen: Vec<LineId, { MAX_BUTTONS + 5 }> = Vec::new();
        for line in self.input_lines() {
            if seen.contains(&line) {
                return Err(ConfigError::DuplicateInputLine(line));
            }
            seen.push(line)
                .map_err(|_| ConfigError::TooManyButtons { max: MAX_BUTTONS })?;
        }

        let mut leds: Vec<LineId, { MAX_BUTTONS + 1 }> = Vec::new();
        for led in self.button_leds().chain(self.status_led) {
            if leds.contains(&led) {
                return Err(ConfigError::DuplicateLed(led));
            }
            leds.push(led)
                .map_err(|_| ConfigError::TooManyButtons { max: MAX_BUTTONS })?;
        }

        let AutofireLimits {
            initial_ms,
            min_ms,
            max_ms,
            step_percent,
            ..
        } = self.autofire;
        if min_ms == 0 || min_ms > initial_ms || initial_ms > max_ms {
            return Err(ConfigError::InvalidAutofireLimits {
                min: min_ms,
                initial: initial_ms,
                max: max_ms,
            });
        }
        if !(1..=100).contains(&step_percent) {
            return Err(ConfigError::InvalidStepPercent(step_percent));
        }

        for control in [self.increase, self.decrease] {
            if let Control::Button(id) = control {
                if id.index() >= self.buttons.len() {
                    return Err(ConfigError::UnknownRateControl(id));
                }
            }
        }

        if self.slider.pulse_ms == 0 {
            return Err(ConfigError::ZeroSliderPulse);
        }
        Ok(())
    }
}

/// Builder for [`GamepadConfig`].
#[derive(Clone, Debug)]
pub struct Builder {
    config: GamepadConfig,
    overflow: bool,
}

impl Builder {
    /// Starts a configuration with no buttons, D-pad UP/DOWN as rate
    /// controls, hat direction reporting and default timings.
    ///
    /// # Arguments
    ///
    /// * `dpad` - The four directional input lines
    /// * `menu` - Input line of the menu control
    pub fn new(dpad: DpadConfig, menu: LineId) -> Self {
        Self {
            config: GamepadConfig {
                buttons: Vec::new(),
                dpad,
                menu,
                increase: Control::Dpad(DpadLine::Up),
                decrease: Control::Dpad(DpadLine::Down),
                status_led: None,
                direction_mode: DirectionMode::Hat,
                autofire: AutofireLimits::DEFAULT,
                slider: SliderConfig::default(),
                blinker: BlinkerConfig::default(),
            },
            overflow: false,
        }
    }

    /// Appends a button; its [`ButtonId`] is its position in call order.
    pub fn button(mut self, button: ButtonConfig) -> Self {
        if self.config.buttons.push(button).is_err() {
            self.overflow = true;
        }
        self
    }

    /// Chooses which controls adjust the autofire rate in the menu.
    pub fn rate_controls(mut self, increase: Control, decrease: Control) -> Self {
        self.config.increase = increase;
        self.config.decrease = decrease;
        self
    }

    pub fn status_led(mut self, led: LineId) -> Self {
        self.config.status_led = Some(led);
        self
    }

    pub fn direction_mode(mut self, mode: DirectionMode) -> Self {
        self.config.direction_mode = mode;
        self
    }

    pub fn autofire(mut self, limits: AutofireLimits) -> Self {
        self.config.autofire = limits;
        self
    }

    pub fn slider(mut self, slider: SliderConfig) -> Self {
        self.config.slider = slider;
        self
    }

    pub fn blinker(mut self, blinker: BlinkerConfig) -> Self {
        self.config.blinker = blinker;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: too many buttons, a shared input
    /// or LED line, a zero HID code, inconsistent autofire limits, a rate
    /// control that names no button, or a zero slider pulse.
    pub fn build(self) -> Result<GamepadConfig, ConfigError> {
        if self.overflow {
            return Err(ConfigError::TooManyButtons { max: MAX_BUTTONS });
        }
        self.config.validate()?;
        Ok(self.config)
    }
}
