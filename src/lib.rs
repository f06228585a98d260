//! Input core for a battery-powered arcade controller.
//!
//! Turns raw digital line samples into clean button and direction events,
//! adds a per-button autofire layer that the controller can reconfigure
//! on-device through a menu, and animates the button and status LEDs from
//! the same state.
//!
//! # Control flow
//!
//! Each call to [`Gamepad::tick`]:
//! 1. reads every input line through [`LineIo`]
//! 2. updates the [`button::PhysicalButton`]s and decodes the D-pad
//! 3. runs the [`menu::MenuController`], which may swallow input to reprogram
//!    autofire
//! 4. otherwise forwards autofire-resolved state to the [`HidEmitter`] and
//!    drives the [`slider::Slider`] and [`blinker::Blinker`]
//!
//! Everything runs to completion on a single loop; no component blocks or
//! keeps its own timer beyond the timestamp handed to it.
//!
//! # Module Organization
//!
//! - [`direction`] - D-pad lookup table and hat/axis encodings
//! - [`autofire`] - Per-button autofire oscillator and rate limits
//! - [`button`] - Edge detection, force-release and the button table
//! - [`menu`] - Configuration menu state machine
//! - [`slider`] / [`blinker`] - LED animators
//! - [`config`] - Declarative hardware description and presets
//! - [`io`] - Line and HID boundaries, embedded-hal pin adapter
//! - [`gamepad`] - Tick loop glue

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unwrap_used
    )
)]

#[macro_use]
mod fmt;

pub mod autofire;
pub mod blinker;
pub mod button;
pub mod config;
pub mod direction;
pub mod error;
pub mod gamepad;
pub mod io;
pub mod menu;
pub mod slider;
pub mod time;

pub use autofire::{Autofire, AutofireLimits};
pub use blinker::Blinker;
pub use button::{ButtonId, ButtonSet, Edge, EdgeResult, MAX_BUTTONS, PhysicalButton};
pub use config::{
    BlinkerConfig, Builder, ButtonConfig, Control, DpadConfig, GamepadConfig, SliderConfig,
};
pub use direction::{Axes, Direction, DirectionMode, DpadLine, decode};
pub use error::ConfigError;
pub use gamepad::Gamepad;
pub use io::{ActiveLevel, HidEmitter, LineId, LineIo, PinBank};
pub use menu::{MenuController, MenuState, RateInputs, Transition};
pub use slider::Slider;
pub use time::{Clock, Millis};
