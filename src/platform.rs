// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Platform primitives consumed by the capture engine.
//!
//! The capture loop only ever needs three things from the hardware:
//! the level of the data line, the level of the frame-active line, and a
//! microsecond counter that can be re-zeroed before each bit. These traits
//! keep the decoder independent of any particular HAL; [`RadioLines`]
//! adapts any pair of `embedded-hal` input pins.

use embedded_hal::digital::InputPin;

/// The two digital lines driven by the radio receiver module.
pub trait SignalLines {
    /// Level of the frame-active line. High for the whole of one transmission.
    fn frame_active(&mut self) -> bool;

    /// Level of the data line.
    fn data_high(&mut self) -> bool;
}

/// Microsecond counter used to time bit periods.
///
/// All measured intervals are well under a millisecond, so the capture
/// engine resets the counter at the start of every bit instead of dealing
/// with rollover.
pub trait MicrosClock {
    /// Re-zeroes the counter.
    fn reset(&mut self);

    /// Microseconds since the last [`reset`](Self::reset).
    fn elapsed_micros(&mut self) -> u32;
}

/// Data and frame-active lines backed by `embedded-hal` input pins.
///
/// A failed pin read is treated as a low level, which ends the bit wait (or
/// the frame) instead of spinning on a faulted line.
///
/// # Examples
///
/// ```ignore
/// let data = Input::new(p.PIN_2, Pull::None);
/// let frame_active = Input::new(p.PIN_3, Pull::None);
/// let mut lines = RadioLines::new(data, frame_active);
/// ```
pub struct RadioLines<D, F> {
    /// Receiver data output
    data: D,
    /// Receiver frame-active output
    frame_active: F,
}

impl<D, F> RadioLines<D, F>
where
    D: InputPin,
    F: InputPin,
{
    /// Wraps the two receiver pins.
    pub fn new(data: D, frame_active: F) -> Self {
        Self { data, frame_active }
    }

    /// Mutable access to the frame-active pin, used to wait for its rising edge.
    pub fn frame_active_pin_mut(&mut self) -> &mut F {
        &mut self.frame_active
    }

    /// Gives the pins back.
    pub fn release(self) -> (D, F) {
        (self.data, self.frame_active)
    }
}

impl<D, F> SignalLines for RadioLines<D, F>
where
    D: InputPin,
    F: InputPin,
{
    fn frame_active(&mut self) -> bool {
        self.frame_active.is_high().unwrap_or(false)
    }

    fn data_high(&mut self) -> bool {
        self.data.is_high().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct FixedPin(bool);

    impl ErrorType for FixedPin {
        type Error = Infallible;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    struct FaultyPin;

    impl ErrorType for FaultyPin {
        type Error = ErrorKind;
    }

    impl InputPin for FaultyPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn reads_pin_levels() {
        let mut lines = RadioLines::new(FixedPin(true), FixedPin(false));
        assert!(lines.data_high());
        assert!(!lines.frame_active());

        lines.frame_active_pin_mut().0 = true;
        assert!(lines.frame_active());
    }

    #[test]
    fn faulted_pins_read_low() {
        let mut lines = RadioLines::new(FaultyPin, FaultyPin);
        assert!(!lines.data_high());
        assert!(!lines.frame_active());
    }

    #[test]
    fn release_returns_pins() {
        let (data, frame_active) = RadioLines::new(FixedPin(true), FixedPin(false)).release();
        assert!(data.0);
        assert!(!frame_active.0);
    }
}
