//! Error types.
//!
//! Runtime input handling cannot fail; the only fallible step is validating a
//! [`GamepadConfig`](crate::config::GamepadConfig) at startup.

use crate::button::ButtonId;
use crate::io::LineId;
use crate::time::Millis;

/// Errors produced while building a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// More buttons declared than the table can hold.
    TooManyButtons {
        /// Table capacity
        max: usize,
    },
    /// Two inputs share one line.
    DuplicateInputLine(LineId),
    /// Two LEDs share one output line.
    DuplicateLed(LineId),
    /// HID button numbers start at 1.
    InvalidButtonCode(u8),
    /// Autofire bounds must satisfy `0 < min <= initial <= max`.
    InvalidAutofireLimits {
        min: Millis,
        initial: Millis,
        max: Millis,
    },
    /// Step percentage outside `1..=100`.
    InvalidStepPercent(u8),
    /// A rate control names a button that does not exist.
    UnknownRateControl(ButtonId),
    /// The slider needs a non-zero pulse length.
    ZeroSliderPulse,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::TooManyButtons { max } => {
                write!(f, "Too many buttons (max {max})")
            }
            ConfigError::DuplicateInputLine(line) => {
                write!(f, "Input line {} used more than once", line.0)
            }
            ConfigError::DuplicateLed(line) => {
                write!(f, "LED line {} used more than once", line.0)
            }
            ConfigError::InvalidButtonCode(code) => write!(f, "Invalid button code {code}"),
            ConfigError::InvalidAutofireLimits { min, initial, max } => write!(
                f,
                "Invalid autofire limits: min {min}, initial {initial}, max {max} (need 0 < min <= initial <= max)"
            ),
            ConfigError::InvalidStepPercent(pct) => {
                write!(f, "Autofire step {pct}% outside 1..=100")
            }
            ConfigError::UnknownRateControl(id) => {
                write!(f, "Rate control refers to unknown button {}", id.0)
            }
            ConfigError::ZeroSliderPulse => write!(f, "Slider pulse length must be non-zero"),
        }
    }
}

impl core::error::Error for ConfigError {}
