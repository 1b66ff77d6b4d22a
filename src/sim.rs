// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Waveform playback for host tests.
//!
//! A [`Waveform`] is a lead-in of low data followed by bit periods, each a
//! high phase then a low phase, with frame-active held high until the last
//! low phase ends. [`SimLines`] and [`SimClock`] share one simulated time
//! base; every line read costs one microsecond, so busy-wait loops advance
//! time the way polling a real pin does.

use std::cell::Cell;
use std::rc::Rc;

use crate::platform::{MicrosClock, SignalLines};

/// High/low phase durations of a `1` bit in microseconds.
pub const ONE: (u32, u32) = (300, 200);

/// High/low phase durations of a `0` bit in microseconds.
pub const ZERO: (u32, u32) = (200, 300);

pub struct Waveform {
    lead_in_us: u32,
    periods: Vec<(u32, u32)>,
}

impl Waveform {
    pub fn new(lead_in_us: u32, periods: Vec<(u32, u32)>) -> Self {
        Self {
            lead_in_us,
            periods,
        }
    }

    /// Nominal periods for the low `bits` bits of `payload`, most significant first.
    pub fn from_payload(payload: u64, bits: u32) -> Self {
        let periods = (0..bits)
            .rev()
            .map(|i| if (payload >> i) & 1 == 1 { ONE } else { ZERO })
            .collect();
        Self::new(100, periods)
    }

    pub fn into_periods(self) -> Vec<(u32, u32)> {
        self.periods
    }

    /// Time at which frame-active falls.
    pub fn end(&self) -> u32 {
        self.lead_in_us + self.periods.iter().map(|(h, l)| h + l).sum::<u32>()
    }

    fn data_high_at(&self, t: u32) -> bool {
        let mut start = self.lead_in_us;
        if t < start {
            return false;
        }
        for (high, low) in &self.periods {
            if t < start + high {
                return true;
            }
            if t < start + high + low {
                return false;
            }
            start += high + low;
        }
        false
    }

    /// Splits the waveform into lines and a clock sharing one time base.
    pub fn play(self) -> (SimLines, SimClock) {
        let now = Rc::new(Cell::new(0));
        let lines = SimLines {
            wave: Rc::new(self),
            now: now.clone(),
        };
        (lines, SimClock { now, origin: 0 })
    }
}

pub struct SimLines {
    wave: Rc<Waveform>,
    now: Rc<Cell<u32>>,
}

impl SimLines {
    fn tick(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t + 1);
        t
    }

    /// Rewinds time to zero so the waveform plays again.
    pub fn rewind(&self) {
        self.now.set(0);
    }
}

impl SignalLines for SimLines {
    fn frame_active(&mut self) -> bool {
        self.tick() < self.wave.end()
    }

    fn data_high(&mut self) -> bool {
        let t = self.tick();
        self.wave.data_high_at(t)
    }
}

pub struct SimClock {
    now: Rc<Cell<u32>>,
    origin: u32,
}

impl MicrosClock for SimClock {
    fn reset(&mut self) {
        self.origin = self.now.get();
    }

    fn elapsed_micros(&mut self) -> u32 {
        self.now.get() - self.origin
    }
}
