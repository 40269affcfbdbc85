//! Frame data types and the byte-accumulating assembler (§4.3).

use crate::address::{decode_address, Address};
use crate::config::{ADDR_LEN, MAX_DIGIPEATERS, MAX_FRAME_LEN, MAX_INFO_LEN, MIN_FRAME_LEN};
use crate::crc::Crc16;
use heapless::Vec;

/// A parsed AX.25 UI frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub destination: Address,
    pub source: Address,
    pub digipeaters: Vec<Address, MAX_DIGIPEATERS>,
    pub control: u8,
    pub pid: u8,
    pub info: Vec<u8, MAX_INFO_LEN>,
    pub valid: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            destination: Address::default(),
            source: Address::default(),
            digipeaters: Vec::new(),
            control: 0,
            pid: 0,
            info: Vec::new(),
            valid: false,
        }
    }
}

/// Accumulates raw wire bytes between a leading and trailing flag, then
/// parses them into a [`Frame`] on completion.
///
/// Owns a fixed `MaxFrameLen`-byte buffer and a running [`Crc16`]; nothing
/// here allocates.
pub struct FrameAssembler {
    buf: Vec<u8, MAX_FRAME_LEN>,
    crc: Crc16,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            crc: Crc16::new(),
        }
    }

    /// Clears the buffer and resets the CRC engine for a new frame.
    pub fn start_frame(&mut self) {
        self.buf.clear();
        self.crc.reset();
    }

    /// Stores one raw wire byte and folds it into the running CRC. Bytes
    /// past `MaxFrameLen` are silently dropped; the resulting CRC mismatch
    /// is what rejects the frame at [`Self::end_frame`].
    pub fn add_byte(&mut self, b: u8) {
        if self.buf.push(b).is_ok() {
            self.crc.update(b);
        }
    }

    /// Number of bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Finalizes the frame: valid iff the buffer is at least `MinFrameLen`
    /// bytes and the CRC trailer closes to the good residual.
    pub fn end_frame(&self) -> Frame {
        let valid = self.buf.len() >= MIN_FRAME_LEN && self.crc.is_good();
        if !valid {
            return Frame {
                valid: false,
                ..Frame::default()
            };
        }
        parse(&self.buf)
    }
}

/// Parses a complete, CRC-validated wire buffer into a [`Frame`] (§4.3,
/// parse ordering).
fn parse(buf: &[u8]) -> Frame {
    let mut cursor = 0usize;

    let destination = decode_address(&buf[cursor..cursor + ADDR_LEN]);
    cursor += ADDR_LEN;

    let source = decode_address(&buf[cursor..cursor + ADDR_LEN]);
    cursor += ADDR_LEN;

    let mut digipeaters: Vec<Address, MAX_DIGIPEATERS> = Vec::new();
    let mut prev_last = source.last;
    for _ in 0..MAX_DIGIPEATERS {
        if prev_last {
            break;
        }
        if cursor + ADDR_LEN > buf.len() {
            break;
        }
        let addr = decode_address(&buf[cursor..cursor + ADDR_LEN]);
        cursor += ADDR_LEN;
        prev_last = addr.last;
        // Fixed capacity MAX_DIGIPEATERS, loop bound matches it.
        let _ = digipeaters.push(addr);
    }

    let control = *buf.get(cursor).unwrap_or(&0);
    cursor += 1;
    let pid = *buf.get(cursor).unwrap_or(&0);
    cursor += 1;

    let mut info: Vec<u8, MAX_INFO_LEN> = Vec::new();
    if buf.len() >= cursor + 2 {
        let info_end = buf.len() - 2; // drop the 2-byte CRC trailer
        let raw_info = &buf[cursor..info_end];
        let take = raw_info.len().min(MAX_INFO_LEN);
        // `take` is bounded by MAX_INFO_LEN, the buffer's own capacity.
        let _ = info.extend_from_slice(&raw_info[..take]);
    }

    Frame {
        destination,
        source,
        digipeaters,
        control,
        pid,
        info,
        valid: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_address(call: &str, ssid: u8, last: bool) -> [u8; 7] {
        let mut out = [0x40u8; 7];
        let call_bytes = call.as_bytes();
        for i in 0..6 {
            let c = *call_bytes.get(i).unwrap_or(&b' ');
            out[i] = c << 1;
        }
        out[6] = ((ssid & 0x0F) << 1) | if last { 1 } else { 0 };
        out
    }

    fn build_frame_bytes(info: &[u8]) -> heapless::Vec<u8, MAX_FRAME_LEN> {
        let mut buf: heapless::Vec<u8, MAX_FRAME_LEN> = heapless::Vec::new();
        buf.extend_from_slice(&wire_address("APRS", 0, false)).unwrap();
        buf.extend_from_slice(&wire_address("N0CALL", 0, true)).unwrap();
        buf.push(0x03).unwrap();
        buf.push(0xF0).unwrap();
        buf.extend_from_slice(info).unwrap();

        let mut crc = Crc16::new();
        for &b in buf.iter() {
            crc.update(b);
        }
        let fcs = crc.value();
        buf.push((fcs & 0xFF) as u8).unwrap();
        buf.push((fcs >> 8) as u8).unwrap();
        buf
    }

    fn build_frame_bytes_with_digis(digis: &[(&str, u8)], info: &[u8]) -> heapless::Vec<u8, MAX_FRAME_LEN> {
        let mut buf: heapless::Vec<u8, MAX_FRAME_LEN> = heapless::Vec::new();
        buf.extend_from_slice(&wire_address("APRS", 0, false)).unwrap();
        buf.extend_from_slice(&wire_address("N0CALL", 0, digis.is_empty())).unwrap();
        for (i, &(call, ssid)) in digis.iter().enumerate() {
            let last = i == digis.len() - 1;
            buf.extend_from_slice(&wire_address(call, ssid, last)).unwrap();
        }
        buf.push(0x03).unwrap();
        buf.push(0xF0).unwrap();
        buf.extend_from_slice(info).unwrap();

        let mut crc = Crc16::new();
        for &b in buf.iter() {
            crc.update(b);
        }
        let fcs = crc.value();
        buf.push((fcs & 0xFF) as u8).unwrap();
        buf.push((fcs >> 8) as u8).unwrap();
        buf
    }

    #[test]
    fn assembles_and_validates_a_well_formed_frame() {
        let wire = build_frame_bytes(b"!test payload");
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        for &b in wire.iter() {
            asm.add_byte(b);
        }
        let frame = asm.end_frame();
        assert!(frame.valid);
        assert_eq!(frame.destination.callsign.as_str(), "APRS");
        assert_eq!(frame.source.callsign.as_str(), "N0CALL");
        assert_eq!(frame.control, 0x03);
        assert_eq!(frame.pid, 0xF0);
        assert_eq!(frame.info.as_slice(), b"!test payload");
    }

    #[test]
    fn short_frame_is_invalid() {
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        for b in 0..17u8 {
            asm.add_byte(b);
        }
        let frame = asm.end_frame();
        assert!(!frame.valid);
    }

    #[test]
    fn corrupted_byte_fails_crc() {
        let mut wire = build_frame_bytes(b"hello");
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        for &b in wire.iter() {
            asm.add_byte(b);
        }
        assert!(!asm.end_frame().valid);
    }

    #[test]
    fn info_field_longer_than_cap_is_truncated_not_invalidated() {
        let long_info = [0x41u8; 300];
        let wire = build_frame_bytes(&long_info);
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        for &b in wire.iter() {
            asm.add_byte(b);
        }
        let frame = asm.end_frame();
        assert!(frame.valid);
        assert_eq!(frame.info.len(), MAX_INFO_LEN);
    }

    #[test]
    fn start_frame_resets_state_between_frames() {
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        asm.add_byte(0xAA);
        asm.add_byte(0xBB);
        asm.start_frame();
        assert_eq!(asm.len(), 0);
    }

    #[test]
    fn digipeater_path_is_parsed_and_control_pid_info_follow_it() {
        let wire = build_frame_bytes_with_digis(&[("WIDE1", 1), ("WIDE2", 2)], b"!digipeated");
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        for &b in wire.iter() {
            asm.add_byte(b);
        }
        let frame = asm.end_frame();
        assert!(frame.valid);
        assert_eq!(frame.digipeaters.len(), 2);
        assert_eq!(frame.digipeaters[0].callsign.as_str(), "WIDE1");
        assert_eq!(frame.digipeaters[0].ssid, 1);
        assert!(!frame.digipeaters[0].last);
        assert_eq!(frame.digipeaters[1].callsign.as_str(), "WIDE2");
        assert_eq!(frame.digipeaters[1].ssid, 2);
        assert!(frame.digipeaters[1].last);
        assert_eq!(frame.control, 0x03);
        assert_eq!(frame.pid, 0xF0);
        assert_eq!(frame.info.as_slice(), b"!digipeated");
    }

    #[test]
    fn zero_digipeaters_does_not_consume_control_pid_or_info() {
        let wire = build_frame_bytes_with_digis(&[], b"!no digis here");
        let mut asm = FrameAssembler::new();
        asm.start_frame();
        for &b in wire.iter() {
            asm.add_byte(b);
        }
        let frame = asm.end_frame();
        assert!(frame.valid);
        assert!(frame.digipeaters.is_empty());
        assert_eq!(frame.control, 0x03);
        assert_eq!(frame.pid, 0xF0);
        assert_eq!(frame.info.as_slice(), b"!no digis here");
    }
}
