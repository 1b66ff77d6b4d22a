// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! RP2350A Wireless Temperature Receiver
//!
//! This firmware listens to a pulse-width encoded 433MHz temperature sensor
//! through an off-the-shelf receiver module and logs every validated reading
//! over defmt/RTT, using the Embassy async runtime.
//!
//! # Hardware Configuration
//! - **Microcontroller**: RP2350A (ARM Cortex-M33)
//! - **Receiver Data**: GPIO 2
//! - **Receiver Frame Active**: GPIO 3
//! - **Status LED**: GPIO 25
//!
//! # Features
//! - 64-bit frame capture with 400-800µs bit-period validation
//! - Whole-frame XOR checksum and per-nibble parity checks
//! - Capture runs with interrupts masked, so no frame is ever observed half-written
//! - Real-time defmt logging of every reading, good or bad
//!
//! # Build
//! ```bash
//! cargo build --release --features rp2350 --target thumbv8m.main-none-eabihf
//! ```
//!
//! # Flash
//! ```bash
//! cargo run --release --features rp2350 --target thumbv8m.main-none-eabihf
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Instant, Timer};
use thermo_rx::config::{DATA_PIN, FRAME_ACTIVE_PIN, POLL_INTERVAL_MS, STATUS_LED_PIN};
use thermo_rx::{BitTiming, MicrosClock, RadioLines, Receiver, run_edge_task};
use {defmt_rtt as _, panic_probe as _};

/// Program metadata for picotool info command
///
/// This information is embedded in the binary and can be read by picotool
/// to display program information when querying the firmware.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"Temperature Receiver"),
    embassy_rp::binary_info::rp_program_description!(c"RP2350A pulse-width RF temperature receiver"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// The one receiver instance; edges are routed here after `begin()`.
static RECEIVER: Receiver = Receiver::new(BitTiming::standard());

/// Microsecond clock backed by the Embassy time driver.
///
/// Instants are 64-bit, so rollover never happens; `reset` just moves the
/// origin to now.
struct EmbassyClock {
    origin: Instant,
}

impl EmbassyClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl MicrosClock for EmbassyClock {
    fn reset(&mut self) {
        self.origin = Instant::now();
    }

    fn elapsed_micros(&mut self) -> u32 {
        self.origin.elapsed().as_micros() as u32
    }
}

/// Main receiver task
///
/// Initializes the receiver lines and status LED, starts the receiver and
/// runs two futures side by side:
/// 1. The edge task, which owns both lines and captures each frame
/// 2. The consumer loop, which polls for new frames and logs them
///
/// # Safety
/// Never returns. Runs indefinitely until power loss or reset.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("RP2350A Temperature Receiver Starting!");
    let p = embassy_rp::init(Default::default());

    // Status LED on GPIO 25
    let mut led = Output::new(p.PIN_25, Level::Low);

    // Receiver module outputs, driven push-pull by the module
    let data = Input::new(p.PIN_2, Pull::None);
    let frame_active = Input::new(p.PIN_3, Pull::None);
    let mut lines = RadioLines::new(data, frame_active);
    let mut clock = EmbassyClock::new();

    info!(
        "data=GPIO{} frame-active=GPIO{} led=GPIO{}",
        DATA_PIN, FRAME_ACTIVE_PIN, STATUS_LED_PIN
    );

    RECEIVER.begin();
    led.set_high(); // Set LED high to indicate ready state

    let consumer = async {
        let mut last_serial: Option<u8> = None;
        loop {
            if RECEIVER.is_data_ready() {
                let reading = RECEIVER.read();
                led.toggle();

                if let Some(last) = last_serial {
                    let missed = reading.serial().wrapping_sub(last).wrapping_sub(1);
                    if missed > 0 {
                        warn!("missed {} frame(s)", missed);
                    }
                }
                last_serial = Some(reading.serial());

                if reading.is_checksum_ok() {
                    info!(
                        "#{}: {} C / {} F",
                        reading.serial(),
                        reading.celsius_temperature(),
                        reading.decoded.fahrenheit_temperature()
                    );
                } else {
                    warn!(
                        "#{}: rejected frame {=u64:#x} (checksum {=u8:#x}, parity {=u8:#x})",
                        reading.serial(),
                        reading.payload(),
                        reading.decoded.checksum,
                        reading.decoded.byte_parity
                    );
                }
            }
            Timer::after_millis(POLL_INTERVAL_MS).await;
        }
    };

    join(run_edge_task(&mut lines, &mut clock), consumer).await;
}
