//! Runtime-tunable parameters (§6) plus the compile-time buffer limits that
//! back the allocation-free frame/address types in [`crate::frame`].

/// Hard upper bound on ring/accumulator sizes, fixed at compile time because
/// this crate never allocates. `Config` may be tuned at runtime, but its
/// values must fit inside these caps.
pub const MAX_FRAME_LEN: usize = 330;
pub const MIN_FRAME_LEN: usize = 18;
pub const MAX_INFO_LEN: usize = 256;
pub const MAX_DIGIPEATERS: usize = 8;
pub const ADDR_LEN: usize = 7;

/// Largest samples-per-symbol ratio this crate will size ring buffers for.
/// `Fs = 26400, Fb = 1200` gives 22; this leaves headroom for off-spec
/// sample rates without growing every instance's footprint.
pub const MAX_SAMPLES_PER_SYMBOL: usize = 64;

/// Runtime configuration for a [`crate::pipeline::Pipeline`].
///
/// Mirrors the §6 configuration table. `Config::default()` reproduces the
/// defaults listed there exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Sample rate in Hz (`Fs`).
    pub sample_rate_hz: u32,
    /// Baud rate in symbols/sec (`Fb`).
    pub baud_rate_hz: u32,
    /// Mark tone frequency in Hz.
    pub mark_hz: u32,
    /// Space tone frequency in Hz.
    pub space_hz: u32,
    /// Energy threshold above which carrier-detect starts counting up.
    pub carrier_threshold: u32,
    /// PLL frequency pull range, in dphase units either side of nominal.
    pub pll_pull_range: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate_hz: 26_400,
            baud_rate_hz: 1_200,
            mark_hz: 2_200,
            space_hz: 1_200,
            carrier_threshold: 10,
            pll_pull_range: 100,
        }
    }
}

/// Raised by [`Config::validate`] when a configuration cannot be realized by
/// this crate's fixed-size buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `sample_rate_hz` or `baud_rate_hz` is zero.
    ZeroRate,
    /// `sample_rate_hz / baud_rate_hz` exceeds [`MAX_SAMPLES_PER_SYMBOL`].
    OversampleTooLarge,
}

impl Config {
    /// Oversampling ratio `N = Fs / Fb`, rounded down like the reference
    /// integer division (§3: "Oversampling ratio `N = Fs / Fb = 22`").
    pub fn samples_per_symbol(&self) -> u32 {
        self.sample_rate_hz / self.baud_rate_hz.max(1)
    }

    /// Checks that this configuration's derived sizes fit within the
    /// crate's compile-time buffer caps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 || self.baud_rate_hz == 0 {
            return Err(ConfigError::ZeroRate);
        }
        if self.samples_per_symbol() as usize > MAX_SAMPLES_PER_SYMBOL {
            return Err(ConfigError::OversampleTooLarge);
        }
        Ok(())
    }
}
