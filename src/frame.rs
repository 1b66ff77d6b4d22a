// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Frame records and the checksum/parity decoder.
//!
//! A transmission arrives as 64 bits, most significant first. Read as eight
//! big-endian bytes, the frame carries:
//!
//! ```text
//!  byte:   0      1      2      3      4        5        6        7
//!        [ ?? ] [ ?? ] [ ?? ] [ ?? ] [T hi ] [T mid ] [T lo ] [ check ]
//!  bits:  63..56 ...                  31..24   23..16   15..8    7..0
//! ```
//!
//! # Temperature Bytes
//!
//! Each temperature byte carries one nibble of a 12-bit tenths-of-a-degree
//! value in its low four bits. The high nibble is a parity tag: `0x8` when
//! the low nibble has odd parity, `0x0` when it has even parity, so every
//! tagged byte has even parity overall. Any other tag is a parity failure.
//!
//! # Checksum
//!
//! The transmitter chooses the last byte so that all eight bytes XOR to
//! `0xFF`.
//!
//! # Integrity
//!
//! A decoded temperature is only meaningful when the checksum is `0xFF` and
//! none of the three temperature bytes failed parity. Decoding itself never
//! fails; callers check [`DecodedReading::is_checksum_ok`] first.

/// XOR of all eight bytes of a valid frame
pub const CHECKSUM_OK: u8 = 0xFF;

/// `byte_parity` flag for the byte at bit offset 24 (temperature bits 11..8)
pub const PARITY_BAD_HIGH: u8 = 0x08;

/// `byte_parity` flag for the byte at bit offset 16 (temperature bits 7..4)
pub const PARITY_BAD_MID: u8 = 0x04;

/// `byte_parity` flag for the byte at bit offset 8 (temperature bits 3..0)
pub const PARITY_BAD_LOW: u8 = 0x02;

/// Bits of `byte_parity` inspected by the integrity check
pub const TEMPERATURE_PARITY_MASK: u8 = PARITY_BAD_HIGH | PARITY_BAD_MID | PARITY_BAD_LOW;

/// Temperature bytes as (bit offset, parity flag, nibble shift), most significant first.
const TEMPERATURE_BYTES: [(u32, u8, u32); 3] = [
    (24, PARITY_BAD_HIGH, 8),
    (16, PARITY_BAD_MID, 4),
    (8, PARITY_BAD_LOW, 0),
];

/// One captured transmission.
///
/// Zeroed until the first capture completes. `serial` increments (wrapping)
/// on every completed capture, valid or not, so consumers can spot missed
/// or repeated reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Raw bits in transmission order, newest bit least significant
    pub payload: u64,
    /// Capture counter, wraps at 256
    pub serial: u8,
}

impl Frame {
    /// Decodes this frame's payload.
    pub fn decode(&self) -> DecodedReading {
        decode(self.payload)
    }
}

/// Integrity fields and temperature derived from a payload.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedReading {
    /// XOR of the eight payload bytes; `0xFF` for a valid frame
    pub checksum: u8,
    /// Parity failure flags, see [`TEMPERATURE_PARITY_MASK`]
    pub byte_parity: u8,
    /// 12-bit temperature in tenths of a degree Celsius
    pub raw_temperature: u16,
    /// Temperature in degrees Celsius
    pub celsius_temperature: f32,
}

impl DecodedReading {
    /// Returns `true` when the checksum is `0xFF` and all three temperature
    /// bytes passed parity.
    ///
    /// Bits of `byte_parity` outside [`TEMPERATURE_PARITY_MASK`] are ignored.
    pub fn is_checksum_ok(&self) -> bool {
        self.checksum == CHECKSUM_OK && self.byte_parity & TEMPERATURE_PARITY_MASK == 0
    }

    /// Temperature in degrees Fahrenheit.
    pub fn fahrenheit_temperature(&self) -> f32 {
        self.celsius_temperature * 9.0 / 5.0 + 32.0
    }
}

/// A frame together with its decoded integrity fields.
///
/// This is what [`Receiver::read`](crate::receiver::Receiver::read) hands to
/// the consumer: an independent copy, never a view into the receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// The captured frame
    pub frame: Frame,
    /// Fields computed from `frame.payload`
    pub decoded: DecodedReading,
}

impl Reading {
    /// Capture counter of the underlying frame.
    pub fn serial(&self) -> u8 {
        self.frame.serial
    }

    /// Raw 64-bit payload of the underlying frame.
    pub fn payload(&self) -> u64 {
        self.frame.payload
    }

    /// See [`DecodedReading::is_checksum_ok`].
    pub fn is_checksum_ok(&self) -> bool {
        self.decoded.is_checksum_ok()
    }

    /// Temperature in degrees Celsius. Only meaningful when
    /// [`is_checksum_ok`](Self::is_checksum_ok) holds.
    pub fn celsius_temperature(&self) -> f32 {
        self.decoded.celsius_temperature
    }
}

impl From<Frame> for Reading {
    fn from(frame: Frame) -> Self {
        Self {
            frame,
            decoded: frame.decode(),
        }
    }
}

/// Decodes a 64-bit payload into checksum, parity flags and temperature.
///
/// Pure and total: every payload produces a reading, and integrity is left
/// for the caller to check.
///
/// # Examples
///
/// ```
/// use thermo_rx::frame::decode;
///
/// // Temperature bytes 0x81 0x05 0x82 carry nibbles 1, 5, 2 -> 15.2°C.
/// let reading = decode(0x0000_0000_8105_82F9);
/// assert!(reading.is_checksum_ok());
/// assert_eq!(reading.raw_temperature, 152);
/// ```
pub fn decode(payload: u64) -> DecodedReading {
    let mut byte_parity = 0u8;
    let mut raw_temperature = 0u16;

    for (offset, flag, shift) in TEMPERATURE_BYTES {
        let byte = (payload >> offset) as u8;
        if temperature_byte_parity_bad(byte) {
            byte_parity |= flag;
        }
        raw_temperature |= u16::from(byte & 0x0F) << shift;
    }

    DecodedReading {
        checksum: checksum(payload),
        byte_parity,
        raw_temperature,
        celsius_temperature: f32::from(raw_temperature) / 10.0,
    }
}

/// XOR of the eight bytes of `payload`.
pub fn checksum(payload: u64) -> u8 {
    payload.to_be_bytes().iter().fold(0, |acc, byte| acc ^ byte)
}

/// Returns `true` when a temperature byte's tag does not match the parity
/// of its low nibble.
///
/// Odd low-nibble parity requires tag `0x8`; even parity requires tag `0x0`.
pub fn temperature_byte_parity_bad(byte: u8) -> bool {
    let odd = (byte & 0x0F).count_ones() % 2 == 1;
    let tag = byte >> 4;
    if odd { tag != 0x8 } else { tag != 0x0 }
}

/// Builds a correctly tagged temperature byte for `nibble` (low four bits
/// only), the way the transmitter does.
pub fn tag_temperature_nibble(nibble: u8) -> u8 {
    let nibble = nibble & 0x0F;
    if nibble.count_ones() % 2 == 1 {
        0x80 | nibble
    } else {
        nibble
    }
}
