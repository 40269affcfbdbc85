//! Receiver state machine: carrier acquisition, flag sync, in-frame
//! reception, completion, and timeout recovery (§4.6).

use crate::frame::{Frame, FrameAssembler};
use crate::nrzi::NrziEvent;

/// 2 s of `Sync` at 1200 baud.
pub const SYNC_TIMEOUT_SYMBOLS: u32 = 2400;
/// Symbol periods of silence in `Receiving` before giving up on the frame.
pub const BYTE_TIMEOUT_SYMBOLS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Idle,
    Sync,
    Receiving,
    Complete,
}

/// Monotonic receiver statistics (§4.6, §7). Every counter saturates
/// rather than wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub frames_received: u32,
    pub frames_valid: u32,
    pub frames_crc_error: u32,
    pub bytes_received: u32,
    pub sync_timeouts: u32,
    /// A completed frame was dropped because the consumer had not taken
    /// the previous one (§7 "Consumer overrun").
    pub frame_drops: u32,
}

impl Stats {
    fn bump(counter: &mut u32) {
        *counter = counter.saturating_add(1);
    }
}

/// What happened on this symbol, for the pipeline to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    None,
    /// A frame just completed with a valid CRC and should be published.
    FramePublished(Frame),
}

/// Orchestrates the demodulator and NRZI layer's output into frames.
/// Owns the frame assembler and the receiver's timers and counters; does
/// not own the latch (the pipeline publishes to it).
pub struct ReceiverStateMachine {
    state: State,
    assembler: FrameAssembler,
    sync_timer: u32,
    byte_timer: u32,
    prev_carrier_present: bool,
    stats: Stats,
}

impl Default for ReceiverStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiverStateMachine {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            assembler: FrameAssembler::new(),
            sync_timer: 0,
            byte_timer: 0,
            prev_carrier_present: false,
            stats: Stats::default(),
        }
    }

    /// Resets to `Idle` with zeroed timers, keeping accumulated stats
    /// (stats are explicitly monotonic for the process lifetime).
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.assembler = FrameAssembler::new();
        self.sync_timer = 0;
        self.byte_timer = 0;
        self.prev_carrier_present = false;
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Called by the pipeline after a completed frame overwrote an unread
    /// one in the latch.
    pub fn record_drop(&mut self) {
        Stats::bump(&mut self.stats.frame_drops);
    }

    /// Advances the state machine by one symbol period.
    ///
    /// `carrier_present` is the demodulator's current carrier-detect flag;
    /// a rising edge drives `Idle -> Sync`. `event` is this symbol's NRZI
    /// output. `frame_taken` reports whether the consumer has taken the
    /// previously published frame, needed only while in `Complete`.
    pub fn on_symbol(
        &mut self,
        carrier_present: bool,
        event: NrziEvent,
        frame_taken: bool,
    ) -> SymbolOutcome {
        let carrier_rising_edge = carrier_present && !self.prev_carrier_present;
        self.prev_carrier_present = carrier_present;

        match self.state {
            State::Idle => {
                if carrier_rising_edge {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("carrier acquired, entering Sync");
                    self.state = State::Sync;
                    self.sync_timer = 0;
                }
                SymbolOutcome::None
            }

            State::Sync => {
                if let NrziEvent::Flag = event {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("flag sync acquired, entering Receiving");
                    self.state = State::Receiving;
                    self.assembler.start_frame();
                    self.byte_timer = 0;
                    return SymbolOutcome::None;
                }
                self.sync_timer += 1;
                if self.sync_timer >= SYNC_TIMEOUT_SYMBOLS {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("sync timeout, returning to Idle");
                    self.state = State::Idle;
                    Stats::bump(&mut self.stats.sync_timeouts);
                }
                SymbolOutcome::None
            }

            State::Receiving => {
                match event {
                    NrziEvent::Flag => {
                        let frame = self.assembler.end_frame();
                        Stats::bump(&mut self.stats.frames_received);
                        if frame.valid {
                            #[cfg(feature = "defmt")]
                            defmt::debug!("frame received, {} info bytes", frame.info.len());
                            Stats::bump(&mut self.stats.frames_valid);
                            self.state = State::Complete;
                            return SymbolOutcome::FramePublished(frame);
                        }
                        #[cfg(feature = "defmt")]
                        defmt::warn!("frame CRC error, discarding");
                        Stats::bump(&mut self.stats.frames_crc_error);
                        self.state = State::Idle;
                    }
                    NrziEvent::Byte(b) => {
                        self.assembler.add_byte(b);
                        Stats::bump(&mut self.stats.bytes_received);
                        self.byte_timer = 0;
                    }
                    NrziEvent::FramingError => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("framing error (seven ones), returning to Idle");
                        self.state = State::Idle;
                        Stats::bump(&mut self.stats.frames_received);
                        Stats::bump(&mut self.stats.frames_crc_error);
                    }
                    NrziEvent::None => {
                        self.byte_timer += 1;
                        if self.byte_timer >= BYTE_TIMEOUT_SYMBOLS {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("byte timeout, returning to Idle");
                            self.state = State::Idle;
                        }
                    }
                }
                SymbolOutcome::None
            }

            State::Complete => {
                if let NrziEvent::Flag = event {
                    if frame_taken {
                        self.state = State::Sync;
                        self.sync_timer = 0;
                    }
                }
                SymbolOutcome::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_flag(sm: &mut ReceiverStateMachine) -> SymbolOutcome {
        sm.on_symbol(true, NrziEvent::Flag, true)
    }

    #[test]
    fn idle_moves_to_sync_on_carrier_rising_edge() {
        let mut sm = ReceiverStateMachine::new();
        assert_eq!(sm.state(), State::Idle);
        sm.on_symbol(true, NrziEvent::None, true);
        assert_eq!(sm.state(), State::Sync);
    }

    #[test]
    fn sync_times_out_back_to_idle() {
        let mut sm = ReceiverStateMachine::new();
        sm.on_symbol(true, NrziEvent::None, true);
        for _ in 0..SYNC_TIMEOUT_SYMBOLS {
            sm.on_symbol(true, NrziEvent::None, true);
        }
        assert_eq!(sm.state(), State::Idle);
        assert_eq!(sm.stats().sync_timeouts, 1);
    }

    #[test]
    fn flag_in_sync_starts_receiving() {
        let mut sm = ReceiverStateMachine::new();
        sm.on_symbol(true, NrziEvent::None, true);
        run_flag(&mut sm);
        assert_eq!(sm.state(), State::Receiving);
    }

    #[test]
    fn byte_timeout_in_receiving_returns_to_idle() {
        let mut sm = ReceiverStateMachine::new();
        sm.on_symbol(true, NrziEvent::None, true);
        run_flag(&mut sm);
        for _ in 0..BYTE_TIMEOUT_SYMBOLS {
            sm.on_symbol(true, NrziEvent::None, true);
        }
        assert_eq!(sm.state(), State::Idle);
    }

    #[test]
    fn short_frame_is_rejected_and_counted_as_crc_error() {
        let mut sm = ReceiverStateMachine::new();
        sm.on_symbol(true, NrziEvent::None, true);
        run_flag(&mut sm);
        for b in 0..17u8 {
            sm.on_symbol(true, NrziEvent::Byte(b), true);
        }
        let outcome = run_flag(&mut sm);
        assert_eq!(outcome, SymbolOutcome::None);
        assert_eq!(sm.state(), State::Idle);
        assert_eq!(sm.stats().frames_received, 1);
        assert_eq!(sm.stats().frames_valid, 0);
        assert_eq!(sm.stats().frames_crc_error, 1);
    }

    #[test]
    fn complete_returns_to_sync_only_after_consumer_takes_frame() {
        let mut sm = ReceiverStateMachine::new();
        sm.state = State::Complete;
        sm.on_symbol(true, NrziEvent::Flag, false);
        assert_eq!(sm.state(), State::Complete);
        sm.on_symbol(true, NrziEvent::Flag, true);
        assert_eq!(sm.state(), State::Sync);
    }

    #[test]
    fn seven_ones_framing_error_counts_as_received_and_crc_error() {
        let mut sm = ReceiverStateMachine::new();
        sm.on_symbol(true, NrziEvent::None, true);
        run_flag(&mut sm);
        sm.on_symbol(true, NrziEvent::FramingError, true);
        assert_eq!(sm.state(), State::Idle);
        assert_eq!(sm.stats().frames_received, 1);
        assert_eq!(sm.stats().frames_crc_error, 1);
    }
}
