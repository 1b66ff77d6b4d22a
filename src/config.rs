// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Hardware wiring and bit-timing configuration for the temperature receiver.
//!
//! This module defines:
//! - GPIO pin assignments used by the RP2350 firmware
//! - The accepted bit-period window of the pulse-width encoding
//! - Consumer polling cadence
//!
//! # Pin Mapping Summary
//!
//! ## Radio Receiver Module
//! - **Data**: GPIO 2 (bit high/low phases, no pull)
//! - **Frame Active**: GPIO 3 (high for the duration of one transmission, no pull)
//!
//! ## Indicators
//! - **Status LED**: GPIO 25 (onboard LED, toggled on every reading)
//!
//! # Bit Timing
//!
//! Each bit occupies a nominal 500µs period. A period is only accepted when
//! it falls strictly inside 400µs..800µs; within an accepted period the bit
//! is `1` when the high phase is longer than half the period.

/// GPIO pin number for the receiver data line
pub const DATA_PIN: u8 = 2;

/// GPIO pin number for the receiver frame-active line
pub const FRAME_ACTIVE_PIN: u8 = 3;

/// GPIO pin number for status LED (onboard LED on RP2350)
pub const STATUS_LED_PIN: u8 = 25;

/// Nominal length of one bit period in microseconds
pub const NOMINAL_BIT_PERIOD_US: u32 = 500;

/// Exclusive lower bound of an accepted bit period in microseconds
pub const MIN_BIT_PERIOD_US: u32 = 400;

/// Exclusive upper bound of an accepted bit period in microseconds
pub const MAX_BIT_PERIOD_US: u32 = 800;

/// Number of bits in a complete frame payload
pub const PAYLOAD_BITS: u32 = 64;

/// Milliseconds between consumer polls of the ready flag
pub const POLL_INTERVAL_MS: u64 = 100;

/// Accepted bit-period window.
///
/// Periods at or outside either bound are discarded by the capture engine
/// without shifting a bit into the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    /// Exclusive lower bound in microseconds
    pub min_period_us: u32,
    /// Exclusive upper bound in microseconds
    pub max_period_us: u32,
}

impl BitTiming {
    /// Creates the standard 400µs..800µs window.
    ///
    /// `const` so that a receiver can be placed in a `static`.
    pub const fn standard() -> Self {
        Self {
            min_period_us: MIN_BIT_PERIOD_US,
            max_period_us: MAX_BIT_PERIOD_US,
        }
    }

    /// Returns `true` when `period_us` lies strictly inside the window.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermo_rx::config::BitTiming;
    ///
    /// let timing = BitTiming::standard();
    /// assert!(timing.accepts(500));
    /// assert!(!timing.accepts(400));
    /// assert!(!timing.accepts(850));
    /// ```
    pub const fn accepts(&self, period_us: u32) -> bool {
        period_us > self.min_period_us && period_us < self.max_period_us
    }
}

impl Default for BitTiming {
    fn default() -> Self {
        Self::standard()
    }
}
