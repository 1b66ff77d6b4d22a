// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Receiver state, the active-instance registry and the edge dispatcher.
//!
//! This module ties capture and decoding together:
//! - Holds the single "latest frame" slot and its ready flag
//! - Hands frames to the consumer by copy, clearing the ready flag
//! - Routes frame-active edges to whichever receiver is currently active
//!
//! # Lifecycle
//!
//! ```text
//!   begin() ──> edge ──> capture ──> publish (ready = true)
//!                 ^                        │
//!                 └────────────────────────┘
//!   is_data_ready() / read()  (ready = false)
//!   end()  stops routing further edges
//! ```
//!
//! # Single Active Instance
//!
//! Edge delivery goes through one process-wide slot. `begin()` installs a
//! receiver there, replacing whatever was installed before; `end()` removes
//! it again. Running two receivers at once is not supported: switch by
//! calling `end()` on one and `begin()` on the other. The serial counter is
//! process-wide too, so it keeps counting across such a switch.
//!
//! # Hand-off
//!
//! Capture runs without touching shared state and publishes the finished
//! frame, the new serial and the ready flag in one critical section.
//! `read()` copies the frame out under the same lock, so a consumer never
//! observes a partially written frame. An unread frame is simply replaced
//! by the next capture.

use core::cell::{Cell, RefCell};
use core::ptr;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::capture::FrameCapture;
use crate::config::BitTiming;
use crate::frame::{Frame, Reading};
use crate::platform::{MicrosClock, RadioLines, SignalLines};

/// Receiver currently bound to frame-active edges.
static ACTIVE: Mutex<CriticalSectionRawMutex, Cell<Option<&'static Receiver>>> =
    Mutex::new(Cell::new(None));

/// Serial of the last published frame, shared by every receiver.
static SERIAL: Mutex<CriticalSectionRawMutex, Cell<u8>> = Mutex::new(Cell::new(0));

/// Latest-frame slot shared between the capture side and the consumer.
struct Slot {
    latest: Frame,
    ready: bool,
}

/// Temperature receiver.
///
/// `const`-constructible so it can live in a `static` and be handed to
/// [`begin`](Self::begin) as `&'static`.
///
/// # Examples
///
/// ```ignore
/// static RECEIVER: Receiver = Receiver::new(BitTiming::standard());
///
/// RECEIVER.begin();
/// if RECEIVER.is_data_ready() {
///     let reading = RECEIVER.read();
///     if reading.is_checksum_ok() {
///         info!("{} C", reading.celsius_temperature());
///     }
/// }
/// ```
pub struct Receiver {
    /// Pulse-width capture engine
    capture: FrameCapture,
    /// Latest frame and ready flag
    slot: Mutex<CriticalSectionRawMutex, RefCell<Slot>>,
}

impl Receiver {
    /// Creates an idle receiver with the given bit-period window.
    pub const fn new(timing: BitTiming) -> Self {
        Self {
            capture: FrameCapture::new(timing),
            slot: Mutex::new(RefCell::new(Slot {
                latest: Frame {
                    payload: 0,
                    serial: 0,
                },
                ready: false,
            })),
        }
    }

    /// Starts listening.
    ///
    /// Clears the latest frame and the ready flag, then installs this
    /// receiver as the target of frame-active edges. Any receiver that was
    /// active before is displaced. Serials are process-wide and keep counting
    /// across `begin()` calls and receiver switches.
    pub fn begin(&'static self) {
        self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            slot.latest = Frame::default();
            slot.ready = false;
        });

        let previous = ACTIVE.lock(|active| active.replace(Some(self)));
        if previous.is_some_and(|previous| !ptr::eq(previous, self)) {
            warn!("receiver begin() displaced another active receiver");
        }
        info!("receiver listening");
    }

    /// Stops routing frame-active edges to this receiver.
    ///
    /// Has no effect if another receiver is active. A capture already in
    /// progress runs to completion.
    pub fn end(&self) {
        ACTIVE.lock(|active| {
            if active.get().is_some_and(|current| ptr::eq(current, self)) {
                active.set(None);
            }
        });
        info!("receiver stopped");
    }

    /// Returns `true` while this receiver is the target of frame-active edges.
    pub fn is_active(&self) -> bool {
        ACTIVE.lock(|active| active.get().is_some_and(|current| ptr::eq(current, self)))
    }

    /// Returns `true` when a frame has been captured since the last [`read`](Self::read).
    pub fn is_data_ready(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().ready)
    }

    /// Takes the latest frame and decodes it.
    ///
    /// Clears the ready flag. Returns the most recent frame even if it was
    /// already read (or a zeroed frame before the first capture); check
    /// [`Reading::is_checksum_ok`] before trusting the temperature.
    pub fn read(&self) -> Reading {
        let frame = self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            slot.ready = false;
            slot.latest
        });
        Reading::from(frame)
    }

    /// Captures one frame and publishes it.
    ///
    /// Called on the rising edge of frame-active, normally through
    /// [`dispatch_frame_active_rising`]. Blocks until frame-active falls.
    ///
    /// # Returns
    ///
    /// The frame as published.
    pub fn on_frame_active_rising<L, C>(&self, lines: &mut L, clock: &mut C) -> Frame
    where
        L: SignalLines,
        C: MicrosClock,
    {
        let outcome = self.capture.capture(lines, clock);

        let frame = self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            let serial = SERIAL.lock(|last| {
                let next = last.get().wrapping_add(1);
                last.set(next);
                next
            });
            slot.latest = Frame {
                payload: outcome.payload,
                serial,
            };
            slot.ready = true;
            slot.latest
        });

        if !outcome.is_full_length() {
            debug!(
                "frame {} is short: {} bits accepted",
                frame.serial, outcome.accepted_bits
            );
        }
        frame
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(BitTiming::standard())
    }
}

/// Forwards a frame-active rising edge to the active receiver.
///
/// This is the single entry point the platform's edge handling calls into.
///
/// # Returns
///
/// `true` if a receiver was active and captured a frame, `false` if the
/// edge was ignored.
pub fn dispatch_frame_active_rising<L, C>(lines: &mut L, clock: &mut C) -> bool
where
    L: SignalLines,
    C: MicrosClock,
{
    match ACTIVE.lock(|active| active.get()) {
        Some(receiver) => {
            receiver.on_frame_active_rising(lines, clock);
            true
        }
        None => {
            trace!("frame-active edge with no active receiver");
            false
        }
    }
}

/// Edge task driving capture from an async frame-active pin.
///
/// Owns the receiver lines for its whole life. Waits for frame-active to
/// rise, then runs the dispatcher inside a critical section so the capture
/// is atomic with respect to the rest of the system. Never returns.
///
/// # Examples
///
/// ```ignore
/// let mut lines = RadioLines::new(data, frame_active);
/// join(run_edge_task(&mut lines, &mut clock), consumer).await;
/// ```
pub async fn run_edge_task<D, F, C>(lines: &mut RadioLines<D, F>, clock: &mut C)
where
    D: InputPin,
    F: InputPin + Wait,
    C: MicrosClock,
{
    loop {
        if lines.frame_active_pin_mut().wait_for_rising_edge().await.is_err() {
            warn!("frame-active edge wait failed");
            continue;
        }
        critical_section::with(|_| dispatch_frame_active_rising(lines, clock));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PAYLOAD_BITS;
    use crate::frame::{CHECKSUM_OK, checksum};
    use crate::sim::{ONE, Waveform, ZERO};
    use std::sync::{Mutex as StdMutex, MutexGuard};

    /// Serializes tests that touch the registry or the shared serial counter.
    static GLOBALS: StdMutex<()> = StdMutex::new(());

    fn globals() -> MutexGuard<'static, ()> {
        GLOBALS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn leak() -> &'static Receiver {
        Box::leak(Box::new(Receiver::default()))
    }

    /// Captures `wave` on `receiver` directly, bypassing the registry.
    fn capture(receiver: &Receiver, wave: Waveform) -> Frame {
        let (mut lines, mut clock) = wave.play();
        receiver.on_frame_active_rising(&mut lines, &mut clock)
    }

    fn dispatch(wave: Waveform) -> bool {
        let (mut lines, mut clock) = wave.play();
        dispatch_frame_active_rising(&mut lines, &mut clock)
    }

    /// Frame with temperature bytes 0x81 0x05 0x82 and a forced checksum byte.
    fn fifteen_point_two() -> u64 {
        let head = 0x5A00_0000_8105_8200u64;
        head | u64::from(checksum(head) ^ CHECKSUM_OK)
    }

    #[test]
    fn fresh_receiver_has_nothing_ready() {
        let receiver = Receiver::default();
        assert!(!receiver.is_data_ready());

        let reading = receiver.read();
        assert_eq!(reading.frame, Frame::default());
        assert!(!reading.is_checksum_ok());
    }

    #[test]
    fn end_to_end_capture_and_decode() {
        let _guard = globals();
        let receiver = Receiver::default();
        let payload = fifteen_point_two();

        let frame = capture(&receiver, Waveform::from_payload(payload, PAYLOAD_BITS));
        assert_eq!(frame.payload, payload);
        assert!(receiver.is_data_ready());

        let reading = receiver.read();
        assert!(!receiver.is_data_ready());
        assert_eq!(reading.frame, frame);
        assert!(reading.is_checksum_ok());
        assert_eq!(reading.celsius_temperature(), 15.2);
    }

    #[test]
    fn corrupted_transmission_fails_integrity() {
        let _guard = globals();
        let receiver = Receiver::default();
        let mut periods = Waveform::from_payload(fifteen_point_two(), PAYLOAD_BITS).into_periods();
        // Stretch one period out of the window; the frame comes up a bit short.
        periods[20] = (600, 300);
        let frame = capture(&receiver, Waveform::new(100, periods));

        let reading = receiver.read();
        assert_eq!(reading.frame, frame);
        assert!(!reading.is_checksum_ok());
    }

    #[test]
    fn serial_counts_every_capture_and_wraps() {
        let _guard = globals();
        let receiver = Receiver::default();
        let start = capture(&receiver, Waveform::new(0, vec![])).serial;
        for step in 1..=256u32 {
            let frame = capture(&receiver, Waveform::new(0, vec![]));
            assert_eq!(frame.serial, start.wrapping_add(step as u8), "step {}", step);
        }
        let frame = capture(&receiver, Waveform::new(100, vec![ONE]));
        assert_eq!(frame.serial, start.wrapping_add(1));
    }

    #[test]
    fn unread_frame_is_overwritten() {
        let _guard = globals();
        let receiver = Receiver::default();
        let first = capture(&receiver, Waveform::new(100, vec![ONE, ONE]));
        capture(&receiver, Waveform::new(100, vec![ZERO, ONE]));

        let reading = receiver.read();
        assert_eq!(reading.serial(), first.serial.wrapping_add(1));
        assert_eq!(reading.payload(), 0b01);
    }

    #[test]
    fn read_clears_ready_but_keeps_frame() {
        let _guard = globals();
        let receiver = Receiver::default();
        capture(&receiver, Waveform::new(100, vec![ONE]));

        let first = receiver.read();
        assert!(!receiver.is_data_ready());
        let second = receiver.read();
        assert_eq!(first, second);
    }

    #[test]
    fn begin_resets_slot_but_not_serial() {
        let _guard = globals();
        let receiver = leak();
        let before = capture(receiver, Waveform::new(100, vec![ONE]));
        assert!(receiver.is_data_ready());

        receiver.begin();
        assert!(!receiver.is_data_ready());
        assert_eq!(receiver.read().frame, Frame::default());

        let after = capture(receiver, Waveform::new(100, vec![ONE]));
        assert_eq!(after.serial, before.serial.wrapping_add(1));
        receiver.end();
    }

    #[test]
    fn serial_continues_across_receiver_switch() {
        let _guard = globals();
        let first = leak();
        let second = leak();

        first.begin();
        assert!(dispatch(Waveform::new(100, vec![ONE])));
        let before = first.read().serial();
        first.end();

        second.begin();
        assert!(dispatch(Waveform::new(100, vec![ZERO])));
        assert_eq!(second.read().serial(), before.wrapping_add(1));
        second.end();
    }

    #[test]
    fn dispatch_routes_to_active_receiver() {
        let _guard = globals();
        let receiver = leak();
        receiver.begin();
        assert!(receiver.is_active());

        let (mut lines, mut clock) = Waveform::new(100, vec![ONE, ZERO, ONE]).play();
        assert!(dispatch_frame_active_rising(&mut lines, &mut clock));
        assert_eq!(receiver.read().payload(), 0b101);

        receiver.end();
        assert!(!receiver.is_active());
        lines.rewind();
        assert!(!dispatch_frame_active_rising(&mut lines, &mut clock));
        assert!(!receiver.is_data_ready());
    }

    #[test]
    fn begin_displaces_previous_receiver() {
        let _guard = globals();
        let first = leak();
        let second = leak();

        first.begin();
        second.begin();
        assert!(!first.is_active());
        assert!(second.is_active());

        assert!(dispatch(Waveform::new(100, vec![ONE])));
        assert!(second.is_data_ready());
        assert!(!first.is_data_ready());

        // Ending the displaced receiver leaves the active one alone.
        first.end();
        assert!(second.is_active());
        second.end();
        assert!(!second.is_active());
    }
}
