//! Core signal-processing and framing pipeline for a direct-mode APRS
//! packet receiver: AFSK demodulation, NRZI/bit-stuffing, AX.25 UI-frame
//! parsing, and the receiver state machine that orchestrates them.
//!
//! The radio driver, sampling clock, system init, and APRS application
//! layer (position/telemetry/Mic-E decoding) are out of scope; see
//! [`pipeline::Pipeline`] for the external interface this crate exposes
//! to those collaborators.
#![cfg_attr(not(test), no_std)]

pub mod address;
pub mod config;
pub mod crc;
pub mod demod;
pub mod frame;
pub mod latch;
pub mod nrzi;
pub mod pipeline;
pub mod state_machine;

pub use address::Address;
pub use config::{Config, ConfigError};
pub use frame::Frame;
pub use pipeline::Pipeline;
pub use state_machine::{State, Stats};
