//! Per-tick glue: reads every line, updates buttons and the D-pad, routes
//! through the menu and emits HID changes and LED states.

use crate::blinker::Blinker;
use crate::button::{ButtonSet, Edge, MAX_BUTTONS};
use crate::config::{Control, GamepadConfig};
use crate::direction::{self, Direction, DirectionMode, DpadLine};
use crate::io::{HidEmitter, LineIo};
use crate::menu::{MenuController, MenuState, RateInputs, Transition};
use crate::slider::Slider;
use crate::time::{Millis, elapsed};

/// Status blinker speed while the host link is down.
pub const DISCONNECTED_SPEED: i32 = 12;

/// Host-facing code state for one button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Binding {
    /// Set while the current physical hold has had its code chosen.
    holding: bool,
    /// Code chosen for the current hold; `None` when the hold is suppressed.
    chosen: Option<u8>,
    /// Code currently reported as pressed.
    reported: Option<u8>,
}

/// The controller's input core.
pub struct Gamepad {
    config: GamepadConfig,
    buttons: ButtonSet,
    menu_edge: Edge,
    menu: MenuController,
    /// Raw D-pad line states from the last tick, in UP, RIGHT, DOWN, LEFT order.
    dpad: [bool; 4],
    direction: Direction,
    /// Set by a forced centre; cleared once the D-pad is seen centred.
    dpad_held_off: bool,
    /// Indexed by [`crate::button::ButtonId`]; entries past the button count
    /// stay default.
    bindings: [Binding; MAX_BUTTONS],
    reported_direction: Direction,
    connected: bool,
    slider: Slider,
    blinker: Blinker,
    last_activity: Millis,
}

impl Gamepad {
    /// Creates the input core with every control released and the host
    /// treated as disconnected.
    ///
    /// # Arguments
    ///
    /// * `config` - A validated hardware description
    /// * `now` - Current time, used as the animation and idle origin
    pub fn new(config: GamepadConfig, now: Millis) -> Self {
        let buttons = ButtonSet::new(config.buttons().iter(), *config.autofire());
        let slider = Slider::new(*config.slider(), config.button_leds().count(), now);
        let blinker = Blinker::new(*config.blinker());
        info!(
            "gamepad ready: {} buttons, {} leds",
            buttons.len(),
            slider.led_count()
        );
        Self {
            config,
            buttons,
            menu_edge: Edge::default(),
            menu: MenuController::new(now),
            dpad: [false; 4],
            direction: Direction::Centered,
            dpad_held_off: false,
            bindings: [Binding::default(); MAX_BUTTONS],
            reported_direction: Direction::Centered,
            connected: false,
            slider,
            blinker,
            last_activity: now,
        }
    }

    pub fn config(&self) -> &GamepadConfig {
        &self.config
    }

    /// Button table, for diagnostics and tests.
    pub fn buttons(&self) -> &ButtonSet {
        &self.buttons
    }

    /// Current state of the configuration menu.
    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }

    /// Direction after hold-off, before menu masking.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Debounced pressed buttons, one bit per [`crate::ButtonId`].
    pub fn pressed_mask(&self) -> u32 {
        self.buttons.pressed_mask()
    }

    /// Time since the last tick with any input active.
    pub fn idle_ms(&self, now: Millis) -> Millis {
        elapsed(now, self.last_activity)
    }

    /// Runs one control-loop iteration. Returns whether any input is active.
    pub fn tick<L, H>(&mut self, io: &mut L, hid: &mut H, now: Millis, connected: bool) -> bool
    where
        L: LineIo,
        H: HidEmitter,
    {
        self.menu_edge.update(io.read_line(self.config.menu()));
        for button in self.buttons.iter_mut() {
            let raw = io.read_line(button.config().line);
            button.update(raw, now);
        }
        let decoded = self.read_dpad(io);

        let rate = RateInputs {
            increase: self.control_held(self.config.increase()),
            decrease: self.control_held(self.config.decrease()),
        };
        let transition =
            self.menu
                .update(self.menu_edge, &mut self.buttons, rate, &self.config, now);
        match transition {
            Transition::Entered => self.force_center(decoded),
            Transition::Exited => {
                self.force_center(decoded);
                self.all_leds_off(io);
            }
            Transition::None => {}
        }

        if connected != self.connected {
            info!("host link {}", connected);
            if !connected {
                self.bindings = [Binding::default(); MAX_BUTTONS];
                self.reported_direction = Direction::Centered;
            }
        }
        let resync = connected && !self.connected;
        self.connected = connected;
        if connected {
            self.sync_output(hid, resync);
        }

        if self.menu.is_active() {
            self.menu
                .render_leds(&self.buttons, |led, on| io.write_line(led, on));
            if let Some(status) = self.config.status_led() {
                io.write_line(status, true);
            }
        } else {
            self.drive_leds(io, now);
        }

        let active =
            self.buttons.any_pressed() || !decoded.is_centered() || self.menu_edge.pressed;
        if active {
            self.last_activity = now;
        }
        active
    }

    fn read_dpad<L: LineIo>(&mut self, io: &mut L) -> Direction {
        let lines = self.config.dpad().lines();
        for (state, line) in self.dpad.iter_mut().zip(lines) {
            *state = io.read_line(line);
        }
        let [up, right, down, left] = self.dpad;
        let decoded = direction::decode(up, right, down, left);

        if self.dpad_held_off && decoded.is_centered() {
            self.dpad_held_off = false;
        }
        let direction = if self.dpad_held_off {
            Direction::Centered
        } else {
            decoded
        };
        if direction != self.direction {
            debug!("direction {:?}", direction);
            self.direction = direction;
        }
        decoded
    }

    fn control_held(&self, control: Control) -> bool {
        match control {
            Control::Dpad(line) => {
                let index = match line {
                    DpadLine::Up => 0,
                    DpadLine::Right => 1,
                    DpadLine::Down => 2,
                    DpadLine::Left => 3,
                };
                self.dpad[index]
            }
            Control::Button(id) => self.buttons.get(id).is_some_and(|b| b.pressed()),
        }
    }

    fn force_center(&mut self, decoded: Direction) {
        self.direction = Direction::Centered;
        self.dpad_held_off = !decoded.is_centered();
    }

    /// Brings the host in line with the current output state. On `resync`
    /// every held button is re-sent as a fresh press.
    ///
    /// A button's code is chosen once per physical hold, from the shift state
    /// at the press edge, and reused by every autofire re-press in that hold.
    fn sync_output<H: HidEmitter>(&mut self, hid: &mut H, resync: bool) {
        let shift = self.menu.shift_held(self.menu_edge);
        let menu_active = self.menu.is_active();

        for (button, binding) in self.buttons.iter().zip(self.bindings.iter_mut()) {
            if menu_active || !button.pressed() {
                binding.holding = false;
            } else if !binding.holding && (button.press_edge() || resync) {
                let config = button.config();
                binding.chosen = if shift {
                    config.alt_code
                } else {
                    Some(config.code)
                };
                binding.holding = true;
            }

            let output = button.output();
            let desired = if binding.holding && output.pressed {
                binding.chosen
            } else {
                None
            };

            if desired != binding.reported {
                if let Some(code) = binding.reported {
                    hid.release(code);
                }
                if let Some(code) = desired {
                    hid.press(code);
                }
                binding.reported = desired;
            }
        }

        let direction = if menu_active {
            Direction::Centered
        } else {
            self.direction
        };
        if direction != self.reported_direction || resync {
            match self.config.direction_mode() {
                DirectionMode::Hat => hid.set_hat(direction),
                DirectionMode::Axes => hid.set_axes(direction.axes()),
            }
            self.reported_direction = direction;
        }
    }

    fn drive_leds<L: LineIo>(&mut self, io: &mut L, now: Millis) {
        let direction_active = !self.direction.is_centered();
        let active = self.buttons.any_pressed() || direction_active;

        let config = &self.config;
        self.slider.tick(active, now, |index, on| {
            if let Some(led) = config.button_leds().nth(index) {
                io.write_line(led, on);
            }
        });
        if active {
            for button in self.buttons.iter() {
                if let Some(led) = button.config().led {
                    io.write_line(led, button.output().pressed);
                }
            }
        }

        if let Some(status) = self.config.status_led() {
            let speed = if self.connected {
                (self.buttons.pressed_count() + usize::from(direction_active)) as i32
            } else {
                DISCONNECTED_SPEED
            };
            self.blinker.set_speed(speed);
            io.write_line(status, self.blinker.check_state(now));
        }
    }

    fn all_leds_off<L: LineIo>(&self, io: &mut L) {
        for led in self.config.button_leds().chain(self.config.status_led()) {
            io.write_line(led, false);
        }
    }
}
