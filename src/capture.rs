// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Pulse-width frame capture.
//!
//! Converts the edges seen on the receiver's data line into a 64-bit payload
//! while the frame-active line is held high.
//!
//! # Encoding
//!
//! Every bit occupies one period that starts on a rising edge of the data
//! line. The high phase is longer than the low phase for a `1` and shorter
//! for a `0`:
//!
//! ```text
//!          ___________          ______
//!   '1'   |    300µs  |_200µs__|         high > period / 2
//!          ______               ______
//!   '0'   | 200µs|____300µs____|         high <= period / 2
//! ```
//!
//! # Validation
//!
//! Periods outside the configured [`BitTiming`] window are dropped without
//! shifting anything into the payload; the frame carries on with whatever
//! bits remain and the checksum stage catches the damage. Capture itself
//! never fails.
//!
//! # Blocking
//!
//! Capture busy-waits on the lines for the whole transmission. It only
//! returns once frame-active falls; if that never happens, neither does
//! the capture.

use crate::config::{BitTiming, PAYLOAD_BITS};
use crate::platform::{MicrosClock, SignalLines};

/// Result of one capture attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureOutcome {
    /// Accepted bits, newest least significant
    pub payload: u64,
    /// Number of bit periods that passed the timing window
    pub accepted_bits: u32,
    /// Number of bit periods dropped for falling outside the window
    pub rejected_periods: u32,
}

impl CaptureOutcome {
    /// Returns `true` when exactly one payload's worth of bits was accepted.
    pub fn is_full_length(&self) -> bool {
        self.accepted_bits == PAYLOAD_BITS
    }

    /// Shifts in one measured period, dropping it when `classify` rejects it.
    fn push_period(&mut self, capture: &FrameCapture, bit_len: u32, high_len: u32) {
        match capture.classify(bit_len, high_len) {
            Some(bit) => {
                self.payload = (self.payload << 1) | u64::from(bit);
                self.accepted_bits += 1;
            }
            None => {
                self.rejected_periods += 1;
                trace!("dropped bit period of {}us", bit_len);
            }
        }
    }
}

/// Busy-waiting pulse-width capture engine.
///
/// Holds only the timing window; the lines and clock are lent to
/// [`capture`](Self::capture) for the duration of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameCapture {
    timing: BitTiming,
}

impl FrameCapture {
    /// Creates a capture engine with the given bit-period window.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermo_rx::capture::FrameCapture;
    /// use thermo_rx::config::BitTiming;
    ///
    /// let capture = FrameCapture::new(BitTiming::standard());
    /// assert_eq!(capture.classify(500, 300), Some(true));
    /// ```
    pub const fn new(timing: BitTiming) -> Self {
        Self { timing }
    }

    /// Classifies one measured bit period.
    ///
    /// # Arguments
    ///
    /// * `bit_len` - Microseconds from the rising edge to the next rising edge
    /// * `high_len` - Microseconds from the rising edge to the falling edge
    ///
    /// # Returns
    ///
    /// * `Some(true)` - High phase longer than half the period
    /// * `Some(false)` - High phase at most half the period
    /// * `None` - Period outside the timing window
    pub fn classify(&self, bit_len: u32, high_len: u32) -> Option<bool> {
        if !self.timing.accepts(bit_len) {
            return None;
        }
        Some(high_len > bit_len >> 1)
    }

    /// Captures one frame from the receiver lines.
    ///
    /// Call on the rising edge of frame-active. Waits for the data line to
    /// go high, then times each bit period until frame-active falls. Every
    /// wait is gated on frame-active so an early end of frame cuts the
    /// current bit short instead of hanging.
    ///
    /// # Arguments
    ///
    /// * `lines` - Receiver data and frame-active lines
    /// * `clock` - Microsecond counter, reset at the start of each bit
    ///
    /// # Returns
    ///
    /// The accumulated payload, however many bits made it in.
    pub fn capture<L, C>(&self, lines: &mut L, clock: &mut C) -> CaptureOutcome
    where
        L: SignalLines,
        C: MicrosClock,
    {
        let mut outcome = CaptureOutcome::default();

        // Wait for the first rising edge of data
        while !lines.data_high() && lines.frame_active() {}

        while lines.frame_active() {
            clock.reset();
            let bit_start = clock.elapsed_micros();

            // High phase
            while lines.data_high() && lines.frame_active() {}
            let high_end = clock.elapsed_micros();

            // Low phase, ends on the next rising edge
            while !lines.data_high() && lines.frame_active() {}
            let bit_end = clock.elapsed_micros();

            outcome.push_period(
                self,
                bit_end.wrapping_sub(bit_start),
                high_end.wrapping_sub(bit_start),
            );
        }

        debug!(
            "captured {} bits ({} dropped): {:#x}",
            outcome.accepted_bits,
            outcome.rejected_periods,
            outcome.payload
        );
        outcome
    }
}

impl Default for FrameCapture {
    fn default() -> Self {
        Self::new(BitTiming::standard())
    }
}
