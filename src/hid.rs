//! USB HID transport for gamepad reports.
//!
//! The control loop writes into a [`ReportEmitter`]; when a tick changed the
//! report it is handed to [`hid_task`] through [`REPORT_SIGNAL`]. Only the
//! latest report matters, so a signal (which overwrites) is used rather than
//! a queue.

use core::sync::atomic::{AtomicBool, Ordering};

use arcade_pad::{Axes, Direction, HidEmitter};
use embassy_stm32::peripherals::USB;
use embassy_stm32::usb::Driver;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_usb::UsbDevice;
use embassy_usb::class::hid::HidWriter;

/// Size of one input report in bytes.
pub const REPORT_LEN: usize = 5;

/// 16 buttons, a 4-bit hat (null when centred), X and Y.
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x05,       // Usage (Game Pad)
    0xA1, 0x01,       // Collection (Application)
    0x05, 0x09,       //   Usage Page (Button)
    0x19, 0x01,       //   Usage Minimum (1)
    0x29, 0x10,       //   Usage Maximum (16)
    0x15, 0x00,       //   Logical Minimum (0)
    0x25, 0x01,       //   Logical Maximum (1)
    0x75, 0x01,       //   Report Size (1)
    0x95, 0x10,       //   Report Count (16)
    0x81, 0x02,       //   Input (Data, Var, Abs)
    0x05, 0x01,       //   Usage Page (Generic Desktop)
    0x09, 0x39,       //   Usage (Hat Switch)
    0x15, 0x01,       //   Logical Minimum (1)
    0x25, 0x08,       //   Logical Maximum (8)
    0x35, 0x00,       //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14,       //   Unit (Degrees)
    0x75, 0x04,       //   Report Size (4)
    0x95, 0x01,       //   Report Count (1)
    0x81, 0x42,       //   Input (Data, Var, Abs, Null)
    0x65, 0x00,       //   Unit (None)
    0x75, 0x04,       //   Report Size (4)
    0x95, 0x01,       //   Report Count (1)
    0x81, 0x03,       //   Input (Const) padding
    0x09, 0x30,       //   Usage (X)
    0x09, 0x31,       //   Usage (Y)
    0x15, 0x81,       //   Logical Minimum (-127)
    0x25, 0x7F,       //   Logical Maximum (127)
    0x75, 0x08,       //   Report Size (8)
    0x95, 0x02,       //   Report Count (2)
    0x81, 0x02,       //   Input (Data, Var, Abs)
    0xC0,             // End Collection
];

/// Latest report produced by the control loop.
pub static REPORT_SIGNAL: Signal<CriticalSectionRawMutex, GamepadReport> = Signal::new();

/// Whether the host has configured the device.
pub static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Wire form of one input report.
#[derive(Clone, Copy, Default, PartialEq, Eq, defmt::Format)]
pub struct GamepadReport {
    buttons: u16,
    hat: u8,
    x: i8,
    y: i8,
}

impl GamepadReport {
    pub fn to_bytes(self) -> [u8; REPORT_LEN] {
        let [lo, hi] = self.buttons.to_le_bytes();
        [lo, hi, self.hat, self.x as u8, self.y as u8]
    }
}

/// [`HidEmitter`] that accumulates calls into a [`GamepadReport`].
#[derive(Default)]
pub struct ReportEmitter {
    report: GamepadReport,
    dirty: bool,
}

impl ReportEmitter {
    /// Returns the report if any call since the last take changed it.
    pub fn take_changed(&mut self) -> Option<GamepadReport> {
        core::mem::take(&mut self.dirty).then_some(self.report)
    }

    fn update(&mut self, report: GamepadReport) {
        if report != self.report {
            self.report = report;
            self.dirty = true;
        }
    }

    fn button_bit(code: u8) -> Option<u16> {
        match code {
            1..=16 => Some(1 << (code - 1)),
            _ => {
                defmt::warn!("button code {} has no report bit", code);
                None
            }
        }
    }
}

impl HidEmitter for ReportEmitter {
    fn press(&mut self, code: u8) {
        if let Some(bit) = Self::button_bit(code) {
            let mut report = self.report;
            report.buttons |= bit;
            self.update(report);
        }
    }

    fn release(&mut self, code: u8) {
        if let Some(bit) = Self::button_bit(code) {
            let mut report = self.report;
            report.buttons &= !bit;
            self.update(report);
        }
    }

    fn set_hat(&mut self, direction: Direction) {
        let mut report = self.report;
        report.hat = direction.hat_code();
        self.update(report);
    }

    fn set_axes(&mut self, axes: Axes) {
        let mut report = self.report;
        report.x = axes.x;
        report.y = axes.y;
        self.update(report);
    }
}

/// Tracks whether the host has configured the device.
pub struct LinkHandler;

impl embassy_usb::Handler for LinkHandler {
    fn reset(&mut self) {
        CONNECTED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        defmt::info!("usb configured: {}", configured);
        CONNECTED.store(configured, Ordering::Relaxed);
    }
}

/// Runs the USB device state machine.
#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, Driver<'static, USB>>) -> ! {
    device.run().await
}

/// Forwards each signalled report to the interrupt IN endpoint.
#[embassy_executor::task]
pub async fn hid_task(mut writer: HidWriter<'static, Driver<'static, USB>, 8>) -> ! {
    loop {
        let report = REPORT_SIGNAL.wait().await;
        if let Err(e) = writer.write(&report.to_bytes()).await {
            defmt::warn!("report write failed: {:?}", e);
        }
    }
}
