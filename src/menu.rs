//! On-device configuration menu.
//!
//! ```text
//! Normal --menu released, no chord--> Idle
//! Idle --fresh button press--> Configuring(button)
//! Configuring(b) --press b--> toggle autofire on b
//! Configuring(b) --press c--> Configuring(c)
//! Idle | Configuring --menu released--> Normal
//! ```
//!
//! Every entry and exit force-releases all buttons, so nothing pressed across
//! a transition reaches the host.

use crate::button::{ButtonId, ButtonSet, Edge};
use crate::config::GamepadConfig;
use crate::io::LineId;
use crate::time::{Interval, Millis};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    #[default]
    Normal,
    /// Menu open, waiting for a button to configure.
    Idle,
    /// Menu open, tuning one button.
    Configuring(ButtonId),
}

/// Raw state of the rate tuning controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateInputs {
    pub increase: bool,
    pub decrease: bool,
}

/// Mode change caused by one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    None,
    Entered,
    Exited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Adjust {
    Increase,
    Decrease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Adjusting {
    direction: Adjust,
    timer: Interval,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuController {
    state: MenuState,
    /// A button was pressed while the menu control was held in Normal.
    chorded: bool,
    blink_phase: bool,
    blink: Interval,
    adjusting: Option<Adjusting>,
}

impl MenuController {
    /// Creates a controller in [`MenuState::Normal`].
    pub fn new(now: Millis) -> Self {
        Self {
            state: MenuState::Normal,
            chorded: false,
            blink_phase: false,
            blink: Interval::starting_at(now),
            adjusting: None,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// True in Idle or Configuring, while input is withheld from the host.
    pub fn is_active(&self) -> bool {
        self.state != MenuState::Normal
    }

    pub fn selected(&self) -> Option<ButtonId> {
        match self.state {
            MenuState::Configuring(id) => Some(id),
            _ => None,
        }
    }

    pub fn blink_phase(&self) -> bool {
        self.blink_phase
    }

    /// The menu control is acting as a shift key for the alternate layer.
    pub fn shift_held(&self, menu: Edge) -> bool {
        self.state == MenuState::Normal && menu.pressed
    }

    /// Runs one tick of the state machine against freshly updated buttons.
    pub fn update(
        &mut self,
        menu: Edge,
        buttons: &mut ButtonSet,
        rate: RateInputs,
        config: &GamepadConfig,
        now: Millis,
    ) -> Transition {
        if self.state == MenuState::Normal {
            return self.update_normal(menu, buttons, now);
        }

        if menu.fell() {
            self.exit(buttons);
            return Transition::Exited;
        }

        let fresh = buttons
            .iter()
            .find(|b| b.press_edge() && !config.is_rate_control(b.id()))
            .map(|b| b.id());
        if let Some(id) = fresh {
            self.press(id, buttons, now);
        }

        if let MenuState::Configuring(id) = self.state {
            let period = buttons[id].autofire().effective_rate();
            if self.blink.expired(now, period) {
                self.blink_phase = !self.blink_phase;
            }
            self.adjust(id, buttons, rate, config, now);
        }
        Transition::None
    }

    fn update_normal(&mut self, menu: Edge, buttons: &mut ButtonSet, now: Millis) -> Transition {
        if menu.rose() {
            self.chorded = false;
        }
        if menu.pressed && buttons.iter().any(|b| b.press_edge()) {
            self.chorded = true;
        }
        if !menu.fell() {
            return Transition::None;
        }
        if self.chorded {
            self.chorded = false;
            debug!("menu chord consumed");
            return Transition::None;
        }

        self.state = MenuState::Idle;
        self.blink.restart(now);
        self.blink_phase = true;
        self.adjusting = None;
        buttons.force_release_all();
        info!("menu entered");
        Transition::Entered
    }

    fn press(&mut self, id: ButtonId, buttons: &mut ButtonSet, now: Millis) {
        if self.state == MenuState::Configuring(id) {
            let autofire = buttons[id].autofire_mut();
            autofire.toggle();
            info!(
                "button {} autofire {} at {} ms",
                id.0,
                autofire.is_enabled(),
                autofire.rate_ms()
            );
        } else {
            self.state = MenuState::Configuring(id);
            self.adjusting = None;
            info!("button {} selected", id.0);
        }
        self.blink.restart(now);
        self.blink_phase = true;
    }

    fn adjust(
        &mut self,
        id: ButtonId,
        buttons: &mut ButtonSet,
        rate: RateInputs,
        config: &GamepadConfig,
        now: Millis,
    ) {
        let direction = match (rate.increase, rate.decrease) {
            (true, false) => Adjust::Increase,
            (false, true) => Adjust::Decrease,
            _ => {
                self.adjusting = None;
                return;
            }
        };

        if self.adjusting.map(|a| a.direction) != Some(direction) {
            self.adjusting = Some(Adjusting {
                direction,
                timer: Interval::starting_at(now),
            });
            return;
        }
        let Some(adjusting) = self.adjusting.as_mut() else {
            return;
        };
        if !adjusting.timer.expired(now, config.autofire().adjust_interval_ms) {
            return;
        }

        let autofire = buttons[id].autofire_mut();
        match direction {
            Adjust::Increase => autofire.increase_rate(),
            Adjust::Decrease => autofire.decrease_rate(),
        }
        debug!("button {} rate {} ms", id.0, autofire.rate_ms());
    }

    fn exit(&mut self, buttons: &mut ButtonSet) {
        self.state = MenuState::Normal;
        self.chorded = false;
        self.adjusting = None;
        buttons.force_release_all();
        info!("menu exited");
    }

    /// Writes the button LEDs for the current menu state. Does nothing in
    /// Normal.
    pub fn render_leds(&self, buttons: &ButtonSet, mut set_led: impl FnMut(LineId, bool)) {
        match self.state {
            MenuState::Normal => {}
            MenuState::Idle => {
                for led in buttons.iter().filter_map(|b| b.config().led) {
                    set_led(led, true);
                }
            }
            MenuState::Configuring(selected) => {
                for button in buttons.iter() {
                    let Some(led) = button.config().led else {
                        continue;
                    };
                    let on = if button.id() != selected {
                        false
                    } else if button.autofire().is_enabled() {
                        self.blink_phase
                    } else {
                        true
                    };
                    set_led(led, on);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autofire::AutofireLimits;
    use crate::config::{ButtonConfig, Control, DpadConfig};
    use crate::direction::DpadLine;

    struct Rig {
        config: GamepadConfig,
        buttons: ButtonSet,
        menu: MenuController,
        menu_edge: Edge,
    }

    impl Rig {
        fn new() -> Self {
            let config = GamepadConfig::builder(
                DpadConfig {
                    up: LineId(10),
                    right: LineId(11),
                    down: LineId(12),
                    left: LineId(13),
                },
                LineId(20),
            )
            .button(ButtonConfig::new(LineId(0), 1).with_led(LineId(0)))
            .button(ButtonConfig::new(LineId(1), 2).with_led(LineId(1)))
            .button(ButtonConfig::new(LineId(2), 3))
            .rate_controls(Control::Button(ButtonId(2)), Control::Dpad(DpadLine::Down))
            .build()
            .unwrap();
            let buttons = ButtonSet::new(config.buttons().iter(), *config.autofire());
            Self {
                config,
                buttons,
                menu: MenuController::new(0),
                menu_edge: Edge::default(),
            }
        }

        fn tick(&mut self, menu: bool, raw: [bool; 3], rate: RateInputs, now: Millis) -> Transition {
            self.menu_edge.update(menu);
            for (button, raw) in self.buttons.iter_mut().zip(raw) {
                button.update(raw, now);
            }
            self.menu
                .update(self.menu_edge, &mut self.buttons, rate, &self.config, now)
        }

        fn click_menu(&mut self, now: Millis) -> Transition {
            self.tick(true, [false; 3], RateInputs::default(), now);
            self.tick(false, [false; 3], RateInputs::default(), now + 10)
        }

        fn click_button(&mut self, index: usize, now: Millis) {
            let mut raw = [false; 3];
            raw[index] = true;
            self.tick(false, raw, RateInputs::default(), now);
            self.tick(false, [false; 3], RateInputs::default(), now + 10);
        }

        fn leds(&self) -> [bool; 2] {
            let mut leds = [false; 2];
            self.menu
                .render_leds(&self.buttons, |led, on| leds[led.index()] = on);
            leds
        }
    }

    #[test]
    fn menu_release_enters_and_exits() {
        let mut rig = Rig::new();
        assert_eq!(rig.click_menu(0), Transition::Entered);
        assert_eq!(rig.menu.state(), MenuState::Idle);
        assert_eq!(rig.leds(), [true, true]);
        assert_eq!(rig.click_menu(100), Transition::Exited);
        assert_eq!(rig.menu.state(), MenuState::Normal);
        assert_eq!(rig.menu.selected(), None);
    }

    #[test]
    fn chord_does_not_enter_menu() {
        let mut rig = Rig::new();
        let none = RateInputs::default();
        rig.tick(true, [false; 3], none, 0);
        assert!(rig.menu.shift_held(rig.menu_edge));
        rig.tick(true, [true, false, false], none, 10);
        rig.tick(true, [false; 3], none, 20);
        assert_eq!(rig.tick(false, [false; 3], none, 30), Transition::None);
        assert!(!rig.menu.is_active());
        // The next clean click still works.
        assert_eq!(rig.click_menu(40), Transition::Entered);
    }

    #[test]
    fn browsing_leaves_configuration_alone() {
        let mut rig = Rig::new();
        rig.buttons[ButtonId(1)].autofire_mut().set_rate(300);
        rig.click_menu(0);
        rig.click_menu(100);
        let b = &rig.buttons[ButtonId(1)];
        assert!(!b.autofire().is_enabled());
        assert_eq!(b.autofire().rate_ms(), 300);
    }

    #[test]
    fn select_then_toggle_autofire() {
        let mut rig = Rig::new();
        rig.click_menu(0);
        rig.click_button(1, 100);
        assert_eq!(rig.menu.selected(), Some(ButtonId(1)));
        assert!(!rig.buttons[ButtonId(1)].autofire().is_enabled());
        assert_eq!(rig.leds(), [false, true]);

        rig.buttons[ButtonId(1)].autofire_mut().set_rate(500);
        rig.click_button(1, 200);
        let autofire = rig.buttons[ButtonId(1)].autofire();
        assert!(autofire.is_enabled());
        assert_eq!(autofire.rate_ms(), AutofireLimits::DEFAULT.initial_ms);

        rig.click_button(0, 300);
        assert_eq!(rig.menu.selected(), Some(ButtonId(0)));
        assert_eq!(rig.leds(), [true, false]);
    }

    #[test]
    fn rate_control_button_is_not_selectable() {
        let mut rig = Rig::new();
        rig.click_menu(0);
        rig.click_button(2, 100);
        assert_eq!(rig.menu.state(), MenuState::Idle);
    }

    #[test]
    fn selected_led_blinks_with_autofire() {
        let mut rig = Rig::new();
        rig.click_menu(0);
        rig.click_button(0, 100);
        rig.click_button(0, 200);
        rig.buttons[ButtonId(0)].autofire_mut().set_rate(50);
        let none = RateInputs::default();

        let mut seen = [false; 2];
        for now in (220..420).step_by(5) {
            rig.tick(false, [false; 3], none, now);
            seen[usize::from(rig.leds()[0])] = true;
            assert!(!rig.leds()[1]);
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn holding_increase_steps_every_interval() {
        let mut rig = Rig::new();
        rig.click_menu(0);
        rig.click_button(0, 100);
        rig.buttons[ButtonId(0)].autofire_mut().set_rate(100);

        let mut rates = heapless::Vec::<Millis, 8>::new();
        let mut last = 100;
        let up = RateInputs {
            increase: true,
            decrease: false,
        };
        for now in (1000..=1500).step_by(10) {
            rig.tick(false, [false; 3], up, now);
            let rate = rig.buttons[ButtonId(0)].autofire().rate_ms();
            assert!(rate >= last);
            if rate != last {
                assert!(rates.push(rate).is_ok());
                last = rate;
            }
        }
        assert_eq!(rates.as_slice(), &[105, 110, 115, 120, 126]);
    }

    #[test]
    fn rate_never_passes_bounds() {
        let mut rig = Rig::new();
        rig.click_menu(0);
        rig.click_button(0, 100);
        let up = RateInputs {
            increase: true,
            decrease: false,
        };
        let down = RateInputs {
            increase: false,
            decrease: true,
        };
        let mut now = 200;
        for _ in 0..2000 {
            now += 100;
            rig.tick(false, [false; 3], up, now);
        }
        assert_eq!(rig.buttons[ButtonId(0)].autofire().rate_ms(), 2000);
        for _ in 0..2000 {
            now += 100;
            rig.tick(false, [false; 3], down, now);
        }
        assert_eq!(rig.buttons[ButtonId(0)].autofire().rate_ms(), 10);
    }
}
