//! Firmware for a USB arcade controller with on-device autofire setup.
//!
//! # Overview
//!
//! This firmware runs the `arcade_pad` input core on an STM32L052:
//! - Eight buttons and a four-way D-pad read every 5 ms
//! - Per-button autofire, configured on the device through the MENU button
//! - Button LEDs animated by activity, plus a status heartbeat LED
//! - USB HID gamepad report (16 buttons, hat switch, X/Y)
//!
//! # Low Power Operation
//!
//! After a minute without input the loop drops to a 50 ms cadence, letting
//! the executor sleep between polls. Any input restores the fast cadence.
//!
//! # Module Organization
//!
//! - [`hardware`] - Pin mappings and peripheral initialization
//! - [`hid`] - USB HID report, descriptor and transport tasks

#![no_std]
#![no_main]

mod hardware;
mod hid;

use core::sync::atomic::Ordering;

use arcade_pad::{Clock, Gamepad, GamepadConfig, Millis};
use embassy_executor::Spawner;
use embassy_stm32::Config;
use embassy_stm32::rcc::{Hsi48Config, Pll, PllDiv, PllMul, PllSource, Sysclk, mux};
use embassy_time::{Instant, Timer};
use embassy_usb::class::hid::{HidWriter, State};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hardware::Peripherals;
use hid::{
    CONNECTED, LinkHandler, REPORT_DESCRIPTOR, REPORT_SIGNAL, ReportEmitter, hid_task, usb_task,
};

/// Poll period while the controller is in use.
const TICK_MS: u64 = 5;

/// Poll period once idle.
const IDLE_TICK_MS: u64 = 50;

/// Inactivity before switching to the idle cadence.
const IDLE_AFTER_MS: Millis = 60_000;

static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<State<'static>> = StaticCell::new();
static LINK_HANDLER: StaticCell<LinkHandler> = StaticCell::new();

/// Millisecond clock backed by the embassy time driver.
struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> Millis {
        // Truncation is intended: the core works on a wrapping counter.
        Instant::now().as_millis() as Millis
    }
}

/// Creates a clock configuration that can feed the USB peripheral.
///
/// # Clock Settings
///
/// - **HSI16 -> PLL (x4 / 2)**: 32 MHz system clock
/// - **HSI48**: USB clock, trimmed from USB SOF packets (no crystal needed)
fn create_usb_clock_config() -> embassy_stm32::rcc::Config {
    let mut rcc = embassy_stm32::rcc::Config::default();
    rcc.hsi = true;
    rcc.pll = Some(Pll {
        source: PllSource::HSI,
        mul: PllMul::MUL4,
        div: PllDiv::DIV2,
    });
    rcc.sys = Sysclk::PLL1_R;
    rcc.hsi48 = Some(Hsi48Config {
        sync_from_usb: true,
    });
    rcc.mux.clk48sel = mux::Clk48sel::HSI48;
    rcc
}

/// Main entry point for the controller firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks for USB operation
/// 2. Initialize GPIO lines and the USB driver
/// 3. Build the USB device with one HID gamepad interface
/// 4. Spawn the USB and HID report tasks
/// 5. Enter the input loop
///
/// # Main Loop
///
/// Each iteration ticks the input core against the pin bank, signals the
/// HID task if the report changed, then sleeps until the next poll.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_usb_clock_config();

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Arcade pad firmware starting...");

    // Wait 3 seconds after boot to allow debugger connection.
    #[cfg(feature = "debug-mode")]
    Timer::after_secs(3).await;

    let mut peripherals = Peripherals::new(p);
    peripherals.lines.all_off();

    let mut usb_config = embassy_usb::Config::new(0xc0de, 0xcafe);
    usb_config.manufacturer = Some("arcade-pad");
    usb_config.product = Some("Arcade Pad");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = embassy_usb::Builder::new(
        peripherals.usb,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(LINK_HANDLER.init(LinkHandler));

    let hid_config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: TICK_MS as u8,
        max_packet_size: 8,
    };
    let writer = HidWriter::<_, 8>::new(&mut builder, HID_STATE.init(State::new()), hid_config);
    let usb = builder.build();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Spawning USB tasks...");

    spawner.spawn(usb_task(usb)).unwrap();
    spawner.spawn(hid_task(writer)).unwrap();

    let clock = UptimeClock;
    let pad_config = GamepadConfig::arcade();
    defmt::info!("wake line mask: {=u64:#x}", pad_config.input_line_mask());

    let mut gamepad = Gamepad::new(pad_config, clock.now_ms());
    let mut emitter = ReportEmitter::default();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Entering input loop...");

    loop {
        let now = clock.now_ms();
        let connected = CONNECTED.load(Ordering::Relaxed);
        let active = gamepad.tick(&mut peripherals.lines, &mut emitter, now, connected);

        if let Some(report) = emitter.take_changed() {
            #[cfg(feature = "debug-mode")]
            defmt::info!("report {}", report);

            REPORT_SIGNAL.signal(report);
        }

        let period = if !active && gamepad.idle_ms(now) >= IDLE_AFTER_MS {
            IDLE_TICK_MS
        } else {
            TICK_MS
        };
        Timer::after_millis(period).await;
    }
}
