//! Wires the demodulator, NRZI layer, and state machine into the external
//! sample-in/frame-out interface (§6).

use crate::config::{Config, ConfigError};
use crate::demod::{DemodEvent, Demodulator, GoertzelTonePower, TonePower};
use crate::frame::Frame;
use crate::latch::FrameLatch;
use crate::nrzi::NrziDecoder;
use crate::state_machine::{ReceiverStateMachine, State, Stats, SymbolOutcome};

/// The complete sample-to-frame pipeline. Generic over the tone-power
/// strategy (§9); [`Pipeline::new`] builds the plain Goertzel path.
pub struct Pipeline<T: TonePower> {
    demod: Demodulator<T>,
    nrzi: NrziDecoder,
    state_machine: ReceiverStateMachine,
    latch: FrameLatch<Frame>,
}

impl Pipeline<GoertzelTonePower> {
    /// Builds a pipeline with the plain Goertzel tone-power strategy.
    /// Fails only if `config` cannot be realized by this crate's
    /// fixed-size buffers.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let tone_power = GoertzelTonePower::new(config.mark_hz, config.space_hz, config.sample_rate_hz);
        Ok(Self::with_tone_power(tone_power, config))
    }
}

impl<T: TonePower> Pipeline<T> {
    /// Builds a pipeline with a caller-supplied tone-power strategy, e.g.
    /// [`crate::demod::fir::FirTonePower`].
    pub fn with_tone_power(tone_power: T, config: Config) -> Self {
        Self {
            demod: Demodulator::new(tone_power, &config),
            nrzi: NrziDecoder::new(),
            state_machine: ReceiverStateMachine::new(),
            latch: FrameLatch::new(),
        }
    }

    /// Feeds one raw sample. Non-blocking, allocation-free (§5). Most
    /// calls are no-ops until the demodulator reaches a decision instant.
    pub fn process_sample(&mut self, sample: u8) {
        let bit = match self.demod.process_sample(sample) {
            DemodEvent::Bit(b) => b,
            DemodEvent::None => return,
        };
        let carrier_present = self.demod.carrier_present();
        self.on_demodulated_bit(bit, carrier_present);
    }

    fn on_demodulated_bit(&mut self, bit: u8, carrier_present: bool) {
        let was_idle = self.state_machine.state() == State::Idle;

        let event = self.nrzi.process_bit(bit);
        let frame_taken = !self.latch.is_occupied();

        let outcome = self.state_machine.on_symbol(carrier_present, event, frame_taken);

        if was_idle && self.state_machine.state() == State::Sync {
            self.nrzi.reset();
        }

        if let SymbolOutcome::FramePublished(frame) = outcome {
            if self.latch.publish(frame) {
                #[cfg(feature = "defmt")]
                defmt::warn!("consumer overrun, dropping unread frame");
                self.state_machine.record_drop();
            }
        }
    }

    /// Test-only seam: drives the NRZI/state-machine half directly with an
    /// already-demodulated bit, bypassing AFSK tone detection so frame and
    /// state-machine tests do not also depend on tone-decode fidelity.
    #[cfg(test)]
    fn demod_bit_for_test(&mut self, bit: u8) {
        self.on_demodulated_bit(bit, true);
    }

    /// Returns the most recently completed valid frame exactly once, then
    /// `None` until the next one arrives.
    pub fn take_frame(&self) -> Option<Frame> {
        self.latch.take()
    }

    pub fn stats(&self) -> Stats {
        self.state_machine.stats()
    }

    pub fn reset_stats(&mut self) {
        self.state_machine.reset_stats();
    }

    pub fn carrier_present(&self) -> bool {
        self.demod.carrier_present()
    }

    /// Diagnostic only (§4.5.5); not used by the state machine.
    pub fn signal_quality(&self) -> u8 {
        self.demod.signal_quality()
    }

    /// Resets the demodulator, NRZI layer, and state machine to a cold
    /// start. Destructive; only safe to call while the producer is
    /// quiesced (§5).
    pub fn reset(&mut self) {
        self.demod.reset();
        self.nrzi.reset();
        self.state_machine.reset();
        self.latch.clear();
    }
}
