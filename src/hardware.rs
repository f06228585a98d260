//! Pin mapping and peripheral initialization for the arcade controller.
//!
//! Line numbers follow [`GamepadConfig::arcade`](arcade_pad::GamepadConfig::arcade).
//!
//! # Pin Assignments
//!
//! ## Inputs (pull-down, pressed = high)
//! - **PA0..PA5**: A, B, X, Y, L, R (lines 0-5)
//! - **PA6**: SELECT (line 6)
//! - **PA7**: START (line 7)
//! - **PA8**: D-pad UP (line 8)
//! - **PA9**: D-pad RIGHT (line 9)
//! - **PA10**: D-pad DOWN (line 10)
//! - **PA15**: D-pad LEFT (line 11)
//! - **PB0**: MENU (line 12)
//!
//! ## Outputs (high = lit)
//! - **PB1, PB3..PB7**: LEDs for A, B, X, Y, L, R (lines 0-5)
//! - **PC14**: Status LED (line 6)
//!
//! ## USB
//! - **PA11**: USB_DM
//! - **PA12**: USB_DP
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use arcade_pad::{ActiveLevel, PinBank};
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::peripherals::USB;
use embassy_stm32::{bind_interrupts, peripherals, usb};

bind_interrupts!(struct Irqs {
    USB => usb::InterruptHandler<peripherals::USB>;
});

/// Number of input lines wired on the board.
pub const INPUT_LINES: usize = 13;

/// Number of output lines wired on the board.
pub const OUTPUT_LINES: usize = 7;

/// Every button, D-pad and LED line behind the core's line interface.
pub type Lines = PinBank<Input<'static>, Output<'static>, INPUT_LINES, OUTPUT_LINES>;

/// Top-level peripheral container for the controller.
pub struct Peripherals {
    /// Button, D-pad and LED lines
    pub lines: Lines,
    /// USB full-speed device driver
    pub usb: usb::Driver<'static, USB>,
}

impl Peripherals {
    /// Initializes all peripherals from STM32 peripheral singleton.
    ///
    /// All LEDs start dark; inputs use the internal pull-downs.
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        let inputs = [
            Input::new(p.PA0, Pull::Down),
            Input::new(p.PA1, Pull::Down),
            Input::new(p.PA2, Pull::Down),
            Input::new(p.PA3, Pull::Down),
            Input::new(p.PA4, Pull::Down),
            Input::new(p.PA5, Pull::Down),
            Input::new(p.PA6, Pull::Down),
            Input::new(p.PA7, Pull::Down),
            Input::new(p.PA8, Pull::Down),
            Input::new(p.PA9, Pull::Down),
            Input::new(p.PA10, Pull::Down),
            Input::new(p.PA15, Pull::Down),
            Input::new(p.PB0, Pull::Down),
        ];
        let outputs = [
            Output::new(p.PB1, Level::Low, Speed::Low),
            Output::new(p.PB3, Level::Low, Speed::Low),
            Output::new(p.PB4, Level::Low, Speed::Low),
            Output::new(p.PB5, Level::Low, Speed::Low),
            Output::new(p.PB6, Level::Low, Speed::Low),
            Output::new(p.PB7, Level::Low, Speed::Low),
            Output::new(p.PC14, Level::Low, Speed::Low),
        ];

        Self {
            lines: PinBank::new(inputs, outputs, ActiveLevel::High),
            usb: usb::Driver::new(p.USB, Irqs, p.PA12, p.PA11),
        }
    }
}
