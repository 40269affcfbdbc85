//! AFSK demodulator: Goertzel tone detection, PLL bit-clock recovery, bit
//! decision, carrier detection, and signal quality (§4.5).

#[cfg(feature = "fir-prefilter")]
pub mod fir;
pub mod pll;
pub mod tone_power;

pub use pll::Pll;
pub use tone_power::{GoertzelTonePower, TonePower};

#[cfg(feature = "fir-prefilter")]
pub use fir::FirTonePower;

use crate::config::Config;

/// Output of [`Demodulator::process_sample`] for one raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DemodEvent {
    /// Not yet a decision instant.
    None,
    /// A hard-decision bit for this symbol period.
    Bit(u8),
}

/// Converts a stream of samples into a stream of demodulated bits.
///
/// Generic over [`TonePower`] per the strategy redesign in §9: construct
/// with [`GoertzelTonePower`] for the plain path, or
/// [`fir::FirTonePower`] (behind the `fir-prefilter` feature) for the
/// pre-filtered path. Everything else — PLL, bit decision, carrier
/// tracking — is shared.
pub struct Demodulator<T: TonePower> {
    tone_power: T,
    pll: Pll,
    carrier_threshold: u32,
    carrier_counter: u8,
    carrier_present: bool,
    last_mark_mag: f32,
    last_space_mag: f32,
}

impl<T: TonePower> Demodulator<T> {
    pub fn new(tone_power: T, config: &Config) -> Self {
        let samples_per_symbol = config.samples_per_symbol();
        Self {
            tone_power,
            pll: Pll::new(samples_per_symbol, config.pll_pull_range),
            carrier_threshold: config.carrier_threshold,
            carrier_counter: 0,
            carrier_present: false,
            last_mark_mag: 0.0,
            last_space_mag: 0.0,
        }
    }

    /// Resets tone accumulators, the PLL, and carrier state to a cold
    /// start.
    pub fn reset(&mut self) {
        self.tone_power.reset_window();
        self.pll.reset();
        self.carrier_counter = 0;
        self.carrier_present = false;
        self.last_mark_mag = 0.0;
        self.last_space_mag = 0.0;
    }

    /// Feeds one raw sample (`0`/`1`). Returns a bit only on a symbol
    /// decision instant.
    pub fn process_sample(&mut self, sample: u8) -> DemodEvent {
        let x = if sample != 0 { 1.0 } else { -1.0 };
        self.tone_power.push_sample(x);

        let phase_at_decision = match self.pll.advance() {
            Some(phase) => phase,
            None => return DemodEvent::None,
        };

        let (mark_mag, space_mag) = self.tone_power.tone_magnitudes();
        self.tone_power.reset_window();
        self.last_mark_mag = mark_mag;
        self.last_space_mag = space_mag;

        let bit = if mark_mag > space_mag { 1 } else { 0 };

        if mark_mag + space_mag > self.carrier_threshold as f32 {
            self.carrier_counter = self.carrier_counter.saturating_add(1);
            if self.carrier_counter > 5 {
                self.carrier_present = true;
            }
        } else {
            self.carrier_counter = self.carrier_counter.saturating_sub(1);
            if self.carrier_counter == 0 {
                self.carrier_present = false;
            }
        }

        self.pll.on_decision(bit, phase_at_decision);

        DemodEvent::Bit(bit)
    }

    pub fn carrier_present(&self) -> bool {
        self.carrier_present
    }

    /// `100 * |mark - space| / (mark + space + 1)`, clamped to `[0, 100]`
    /// (§4.5.5). Diagnostic only.
    pub fn signal_quality(&self) -> u8 {
        let diff = (self.last_mark_mag - self.last_space_mag).abs();
        let sum = self.last_mark_mag + self.last_space_mag + 1.0;
        let quality = 100.0 * diff / sum;
        if quality < 0.0 {
            0
        } else if quality > 100.0 {
            100
        } else {
            quality as u8
        }
    }
}
