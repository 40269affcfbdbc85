//! NRZI decode, bit de-stuffing, and flag detection (§4.4).

/// Outcome of feeding one demodulated bit through [`NrziDecoder::process_bit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NrziEvent {
    /// Nothing to report yet.
    None,
    /// A `01111110` flag was seen on the decoded bit window.
    Flag,
    /// A complete data byte was assembled, LSB-first.
    Byte(u8),
    /// Seven consecutive 1-bits: a framing error outside any flag. The
    /// stage has already reset itself.
    FramingError,
}

/// NRZI line decoder with HDLC bit de-stuffing and flag detection, chained
/// in that order per byte.
///
/// `window` tracks the last 8 decoded bits regardless of byte boundaries,
/// so a flag is recognized at any bit alignment (§4.4).
pub struct NrziDecoder {
    last_demod_bit: u8,
    window: u8,
    ones: u8,
    acc: u8,
    bit_count: u8,
}

impl Default for NrziDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NrziDecoder {
    pub fn new() -> Self {
        Self {
            last_demod_bit: 0,
            window: 0,
            ones: 0,
            acc: 0,
            bit_count: 0,
        }
    }

    /// Resets all state, as if freshly constructed. Does not touch
    /// `last_demod_bit`'s effect on the next sample beyond zeroing it, same
    /// as a cold start.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds one demodulated bit and returns what this step produced.
    pub fn process_bit(&mut self, input: u8) -> NrziEvent {
        let d = if input == self.last_demod_bit { 1 } else { 0 };
        self.last_demod_bit = input;

        self.window = (self.window << 1) | d;

        if self.window == 0x7E {
            self.acc = 0;
            self.bit_count = 0;
            self.ones = 0;
            return NrziEvent::Flag;
        }

        if d == 1 {
            self.ones += 1;
            if self.ones > 6 {
                self.reset();
                return NrziEvent::FramingError;
            }
        } else {
            if self.ones == 5 {
                // Stuffed bit: discard, do not shift into acc.
                self.ones = 0;
                return NrziEvent::None;
            }
            self.ones = 0;
        }

        self.acc = (self.acc >> 1) | (d << 7);
        self.bit_count += 1;

        if self.bit_count == 8 {
            let byte = self.acc;
            self.acc = 0;
            self.bit_count = 0;
            return NrziEvent::Byte(byte);
        }

        NrziEvent::None
    }
}
