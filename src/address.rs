//! AX.25 address field codec (§4.2).
//!
//! Wire format: 7 bytes. Bytes 0..5 hold the 6 callsign characters, each
//! left-shifted by one bit; byte 6 packs the SSID into bits 4..1 and the
//! address-extension bit into bit 0.

use crate::config::ADDR_LEN;
use heapless::String;

/// A decoded AX.25 address: callsign, SSID, and whether it was the last
/// address in the header (the wire extension bit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Trimmed callsign, uppercase ASCII/digits, no trailing padding.
    pub callsign: String<6>,
    /// Secondary station identifier, 0..15.
    pub ssid: u8,
    /// Set on the wire iff this is the last address in the header.
    pub last: bool,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            callsign: String::new(),
            ssid: 0,
            last: false,
        }
    }
}

/// Decodes a 7-byte wire address field.
///
/// `bytes` must contain at least [`ADDR_LEN`] bytes; only the first 7 are
/// read. Callsign characters are taken from `byte[i] >> 1` for `i` in 0..5;
/// a decoded ASCII space terminates the callsign (padding), matching the
/// source's padding convention rather than treating it as a valid
/// character.
pub fn decode_address(bytes: &[u8]) -> Address {
    debug_assert!(bytes.len() >= ADDR_LEN);

    let mut callsign = String::new();
    for &b in &bytes[0..6] {
        let ch = (b >> 1) as char;
        if ch == ' ' {
            break;
        }
        // Capacity is fixed at 6 and the loop runs at most 6 times, so this
        // cannot fail.
        let _ = callsign.push(ch);
    }

    let ssid = (bytes[6] >> 1) & 0x0F;
    let last = bytes[6] & 0x01 != 0;

    Address { callsign, ssid, last }
}
