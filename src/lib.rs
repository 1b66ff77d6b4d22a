// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Pulse-width RF temperature sensor receiver.
//!
//! Decodes the 64-bit frames sent by a cheap wireless temperature sensor and
//! hands them to the application as validated readings. The radio receiver
//! module does the demodulation; this crate sees two digital lines:
//!
//! - **Frame Active**: high for the duration of one transmission
//! - **Data**: one bit per ~500µs period, encoded in the high-phase length
//!
//! # Architecture
//!
//! ```text
//!  frame-active ↑ ──> dispatch ──> Receiver::on_frame_active_rising
//!                                     │ FrameCapture::capture (busy-wait)
//!                                     v
//!                              latest Frame + ready flag
//!                                     │
//!  consumer: is_data_ready() ──> read() ──> Reading (checksum, parity, °C)
//! ```
//!
//! - [`capture`]: times bit periods and shifts accepted bits into a payload
//! - [`frame`]: checksum, parity and temperature decoding
//! - [`receiver`]: latest-frame hand-off, single active instance, edge task
//! - [`platform`]: the line and clock primitives the capture needs
//! - [`config`]: wiring and timing constants
//!
//! # Features
//!
//! | Feature  | Description |
//! |----------|-------------|
//! | `defmt`  | Library logging through `defmt` |
//! | `log`    | Library logging through the `log` facade |
//! | `rp2350` | Builds the RP2350 firmware binary (implies `defmt`) |
//!
//! # Build
//! ```bash
//! cargo build --release --features rp2350 --target thumbv8m.main-none-eabihf
//! ```

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod capture;
pub mod config;
pub mod frame;
pub mod platform;
pub mod receiver;

#[cfg(test)]
mod sim;

pub use capture::{CaptureOutcome, FrameCapture};
pub use config::BitTiming;
pub use frame::{DecodedReading, Frame, Reading, decode};
pub use platform::{MicrosClock, RadioLines, SignalLines};
pub use receiver::{Receiver, dispatch_frame_active_rising, run_edge_task};
