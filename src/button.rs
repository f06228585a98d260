//! Debounced buttons and the owned button table.

use core::ops::{Index, IndexMut};

use heapless::Vec;

use crate::autofire::{Autofire, AutofireLimits};
use crate::config::ButtonConfig;
use crate::time::Millis;

/// Upper bound on the number of buttons a configuration may declare.
pub const MAX_BUTTONS: usize = 16;

/// Position of a button in the table, assigned in configuration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(pub u8);

impl ButtonId {
    /// Position in the button table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pressed/changed pair for one control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Edge {
    pub pressed: bool,
    /// True only for the update in which `pressed` flipped.
    pub changed: bool,
}

impl Edge {
    /// Latches a new sample; `changed` is set only if it differs.
    pub fn update(&mut self, raw: bool) {
        self.changed = raw != self.pressed;
        self.pressed = raw;
    }

    /// Released to pressed on this update.
    pub const fn rose(&self) -> bool {
        self.pressed && self.changed
    }

    /// Pressed to released on this update.
    pub const fn fell(&self) -> bool {
        !self.pressed && self.changed
    }
}

/// Result of one button update: debounced state plus the autofire-resolved
/// state that is actually reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeResult {
    pub debounced: Edge,
    pub output: Edge,
}

/// One physical control with its autofire oscillator.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalButton {
    id: ButtonId,
    config: ButtonConfig,
    edge: Edge,
    /// Set by a force-release; raw presses are ignored until the line is
    /// seen released.
    held_off: bool,
    autofire: Autofire,
}

impl PhysicalButton {
    /// Creates a released button with autofire off.
    ///
    /// # Arguments
    ///
    /// * `id` - Position in the owning [`ButtonSet`]
    /// * `config` - Input line, HID codes and LED
    /// * `limits` - Autofire rate bounds
    pub fn new(id: ButtonId, config: ButtonConfig, limits: AutofireLimits) -> Self {
        Self {
            id,
            config,
            edge: Edge::default(),
            held_off: false,
            autofire: Autofire::new(limits),
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// Debounced pressed state.
    pub fn pressed(&self) -> bool {
        self.edge.pressed
    }

    /// Whether the debounced state flipped on the last update.
    pub fn changed(&self) -> bool {
        self.edge.changed
    }

    /// Fresh press on this update.
    pub fn press_edge(&self) -> bool {
        self.edge.rose()
    }

    /// Autofire-resolved state, which is what the host sees.
    pub fn output(&self) -> Edge {
        Edge {
            pressed: self.autofire.pressed(),
            changed: self.autofire.changed(),
        }
    }

    pub fn autofire(&self) -> &Autofire {
        &self.autofire
    }

    pub fn autofire_mut(&mut self) -> &mut Autofire {
        &mut self.autofire
    }

    /// Feeds one raw sample through hold-off, edge detection and autofire.
    ///
    /// # Returns
    ///
    /// The debounced and output edges after this sample
    pub fn update(&mut self, raw: bool, now: Millis) -> EdgeResult {
        let mut raw = raw;
        if self.held_off {
            if raw {
                raw = false;
            } else {
                self.held_off = false;
            }
        }

        self.edge.update(raw);
        self.autofire.update(self.edge.pressed, self.edge.changed, now);

        EdgeResult {
            debounced: self.edge,
            output: self.output(),
        }
    }

    /// Injects a synthetic release. A button that is already released (or is
    /// releasing on this update) is left untouched, so repeated calls change
    /// state at most once.
    pub fn force_release(&mut self) -> bool {
        if !self.edge.pressed && !self.autofire.pressed() {
            return false;
        }
        self.edge = Edge {
            pressed: false,
            changed: true,
        };
        self.autofire.force_release();
        self.held_off = true;
        true
    }
}

/// Fixed-capacity table of buttons indexed by [`ButtonId`].
#[derive(Debug, Default)]
pub struct ButtonSet {
    buttons: Vec<PhysicalButton, MAX_BUTTONS>,
}

impl ButtonSet {
    /// Builds the table in configuration order. Entries beyond
    /// [`MAX_BUTTONS`] are ignored; [`crate::Builder::build`] rejects them earlier.
    pub fn new<'a>(
        configs: impl IntoIterator<Item = &'a ButtonConfig>,
        limits: AutofireLimits,
    ) -> Self {
        let mut buttons = Vec::new();
        for (index, config) in configs.into_iter().enumerate() {
            let button = PhysicalButton::new(ButtonId(index as u8), *config, limits);
            if buttons.push(button).is_err() {
                warn!("button table full, ignoring entries from {}", index);
                break;
            }
        }
        Self { buttons }
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Looks up a button, returning `None` for an id outside the table.
    pub fn get(&self, id: ButtonId) -> Option<&PhysicalButton> {
        self.buttons.get(id.index())
    }

    pub fn get_mut(&mut self, id: ButtonId) -> Option<&mut PhysicalButton> {
        self.buttons.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicalButton> {
        self.buttons.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PhysicalButton> {
        self.buttons.iter_mut()
    }

    /// Force-releases every pressed button. See [`PhysicalButton::force_release`].
    pub fn force_release_all(&mut self) {
        for button in self.buttons.iter_mut() {
            button.force_release();
        }
    }

    /// Whether any button is debounced-pressed.
    pub fn any_pressed(&self) -> bool {
        self.buttons.iter().any(PhysicalButton::pressed)
    }

    /// Number of debounced-pressed buttons.
    pub fn pressed_count(&self) -> usize {
        self.buttons.iter().filter(|b| b.pressed()).count()
    }

    /// Debounced pressed state as a bit per [`ButtonId`].
    pub fn pressed_mask(&self) -> u32 {
        self.buttons
            .iter()
            .filter(|b| b.pressed())
            .fold(0, |mask, b| mask | (1 << b.id().index()))
    }
}

impl Index<ButtonId> for ButtonSet {
    type Output = PhysicalButton;

    fn index(&self, id: ButtonId) -> &Self::Output {
        &self.buttons[id.index()]
    }
}

impl IndexMut<ButtonId> for ButtonSet {
    fn index_mut(&mut self, id: ButtonId) -> &mut Self::Output {
        &mut self.buttons[id.index()]
    }
}
