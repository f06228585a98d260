//! Boundaries to the outside world: digital lines in and out, and the HID
//! report sink.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::direction::{Axes, Direction};

/// Identifier of a digital line. Inputs and outputs are numbered
/// independently by the [`LineIo`] implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub u8);

impl LineId {
    /// Position in the pin bank.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reads input lines and drives output lines. `true` always means
/// "asserted", whatever the electrical polarity.
pub trait LineIo {
    fn read_line(&mut self, line: LineId) -> bool;
    fn write_line(&mut self, line: LineId, on: bool);
}

/// Receiver of gamepad output. Calls are fire-and-forget and must tolerate
/// redundant repeats.
pub trait HidEmitter {
    fn press(&mut self, code: u8);
    fn release(&mut self, code: u8);
    fn set_hat(&mut self, direction: Direction);
    fn set_axes(&mut self, axes: Axes);
}

/// Electrical level that means "asserted" for the input lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Pulled down, pressed reads high.
    #[default]
    High,
    /// Pulled up, pressed reads low.
    Low,
}

/// [`LineIo`] over fixed arrays of embedded-hal pins.
///
/// Input line `n` reads `inputs[n]` and output line `n` drives `outputs[n]`.
/// Read failures count as "not asserted"; write failures are dropped. Both
/// are logged.
pub struct PinBank<I, O, const NI: usize, const NO: usize> {
    inputs: [I; NI],
    outputs: [O; NO],
    active: ActiveLevel,
}

impl<I, O, const NI: usize, const NO: usize> PinBank<I, O, NI, NO>
where
    I: InputPin,
    O: OutputPin,
{
    /// Creates a bank over already configured pins.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Input pins, indexed by input [`LineId`]
    /// * `outputs` - Output pins, indexed by output [`LineId`]
    /// * `active` - Electrical level that means pressed or lit
    pub fn new(inputs: [I; NI], outputs: [O; NO], active: ActiveLevel) -> Self {
        Self {
            inputs,
            outputs,
            active,
        }
    }

    /// Drives every output line low.
    pub fn all_off(&mut self) {
        for (index, pin) in self.outputs.iter_mut().enumerate() {
            if pin.set_low().is_err() {
                warn!("output line {} write failed", index);
            }
        }
    }

    /// Releases the pins.
    pub fn into_parts(self) -> ([I; NI], [O; NO]) {
        (self.inputs, self.outputs)
    }
}

impl<I, O, const NI: usize, const NO: usize> LineIo for PinBank<I, O, NI, NO>
where
    I: InputPin,
    O: OutputPin,
{
    fn read_line(&mut self, line: LineId) -> bool {
        let Some(pin) = self.inputs.get(line.index()) else {
            warn!("input line {} out of range", line.0);
            return false;
        };
        let level = match self.active {
            ActiveLevel::High => pin.is_high(),
            ActiveLevel::Low => pin.is_low(),
        };
        match level {
            Ok(asserted) => asserted,
            Err(_) => {
                warn!("input line {} read failed", line.0);
                false
            }
        }
    }

    fn write_line(&mut self, line: LineId, on: bool) {
        let Some(pin) = self.outputs.get_mut(line.index()) else {
            warn!("output line {} out of range", line.0);
            return;
        };
        let result = if on { pin.set_high() } else { pin.set_low() };
        if result.is_err() {
            warn!("output line {} write failed", line.0);
        }
    }
}
