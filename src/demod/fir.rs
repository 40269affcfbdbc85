//! Optional 32-tap Hamming-windowed bandpass pre-filter (§4.5.4).
//!
//! Gated behind the `fir-prefilter` feature. Bandpass-filters the raw
//! sample stream around Mark and around Space before each tone's Goertzel
//! detector sees it; the Goertzel's own per-symbol `q1`/`q2` reset remains
//! the accumulation window, so no separate ring buffer is needed beyond the
//! filter's own tap delay line.

use super::tone_power::{Goertzel, TonePower};
use core::f32::consts::PI;
use micromath::F32Ext;

const TAPS: usize = 32;
const HALF_BANDWIDTH_HZ: f32 = 200.0;

fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Designs a `TAPS`-tap Hamming-windowed bandpass FIR centered on
/// `center_hz` with a `±HALF_BANDWIDTH_HZ` passband, styled after the
/// source's `AFSK_DesignBandpassFilter`.
fn design_bandpass(center_hz: f32, sample_rate_hz: f32) -> [f32; TAPS] {
    let f_lo = (center_hz - HALF_BANDWIDTH_HZ) / sample_rate_hz;
    let f_hi = (center_hz + HALF_BANDWIDTH_HZ) / sample_rate_hz;
    let m = (TAPS - 1) as f32;
    let mut coeffs = [0.0f32; TAPS];
    for (n, c) in coeffs.iter_mut().enumerate() {
        let k = n as f32 - m / 2.0;
        let hi = 2.0 * f_hi * sinc(2.0 * f_hi * k);
        let lo = 2.0 * f_lo * sinc(2.0 * f_lo * k);
        let window = 0.54 - 0.46 * (2.0 * PI * n as f32 / m).cos();
        *c = (hi - lo) * window;
    }
    coeffs
}

/// Fixed-length FIR filter with a circular tap delay line.
struct FirFilter {
    coeffs: [f32; TAPS],
    ring: [f32; TAPS],
    pos: usize,
}

impl FirFilter {
    fn new(coeffs: [f32; TAPS]) -> Self {
        Self {
            coeffs,
            ring: [0.0; TAPS],
            pos: 0,
        }
    }

    fn filter(&mut self, x: f32) -> f32 {
        self.ring[self.pos] = x;
        let mut acc = 0.0f32;
        let mut idx = self.pos;
        for &c in self.coeffs.iter() {
            acc += c * self.ring[idx];
            idx = if idx == 0 { TAPS - 1 } else { idx - 1 };
        }
        self.pos = (self.pos + 1) % TAPS;
        acc
    }

    fn reset(&mut self) {
        self.ring = [0.0; TAPS];
        self.pos = 0;
    }
}

/// `TonePower` implementation that bandpass-filters the sample before
/// handing it to each tone's Goertzel detector.
pub struct FirTonePower {
    mark_filter: FirFilter,
    space_filter: FirFilter,
    mark_goertzel: Goertzel,
    space_goertzel: Goertzel,
}

impl FirTonePower {
    pub fn new(mark_hz: u32, space_hz: u32, sample_rate_hz: u32) -> Self {
        Self {
            mark_filter: FirFilter::new(design_bandpass(mark_hz as f32, sample_rate_hz as f32)),
            space_filter: FirFilter::new(design_bandpass(space_hz as f32, sample_rate_hz as f32)),
            mark_goertzel: Goertzel::new(mark_hz, sample_rate_hz),
            space_goertzel: Goertzel::new(space_hz, sample_rate_hz),
        }
    }
}

impl TonePower for FirTonePower {
    fn push_sample(&mut self, sample: f32) {
        let mark_x = self.mark_filter.filter(sample);
        let space_x = self.space_filter.filter(sample);
        self.mark_goertzel.push(mark_x);
        self.space_goertzel.push(space_x);
    }

    fn tone_magnitudes(&self) -> (f32, f32) {
        (self.mark_goertzel.magnitude_sq(), self.space_goertzel.magnitude_sq())
    }

    fn reset_window(&mut self) {
        self.mark_goertzel.reset();
        self.space_goertzel.reset();
    }
}
