//! Hosted, stdin-driven smoke harness for `aprs_core`.
//!
//! Reads one sample per input byte (bit 0 of the byte, so both `b'0'`/`b'1'`
//! text and raw `0x00`/`0x01` streams work) from a file argument or stdin,
//! feeds it through a [`Pipeline`], and prints each completed frame in
//! TNC2-ish form. A convenience layer only; the core crate performs no I/O
//! of its own (§6).

use aprs_core::{Config, Pipeline};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Read};

fn format_tnc2(frame: &aprs_core::Frame) -> String {
    let mut out = format!("{}", frame.source.callsign);
    if frame.source.ssid != 0 {
        out.push_str(&format!("-{}", frame.source.ssid));
    }
    out.push('>');
    out.push_str(&frame.destination.callsign);
    if frame.destination.ssid != 0 {
        out.push_str(&format!("-{}", frame.destination.ssid));
    }
    for digi in &frame.digipeaters {
        out.push(',');
        out.push_str(&digi.callsign);
        if digi.ssid != 0 {
            out.push_str(&format!("-{}", digi.ssid));
        }
    }
    out.push(':');
    out.push_str(&String::from_utf8_lossy(&frame.info));
    out
}

fn open_input(path: Option<&str>) -> io::Result<Box<dyn Read>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(io::stdin())),
    }
}

fn main() -> io::Result<()> {
    let arg = env::args().nth(1);
    let mut input = open_input(arg.as_deref())?;

    let config = Config::default();
    let mut pipeline = Pipeline::new(config).expect("default config is always valid");

    let mut buf = [0u8; 4096];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            pipeline.process_sample(byte & 1);
            if let Some(frame) = pipeline.take_frame() {
                if frame.valid {
                    println!("{}", format_tnc2(&frame));
                }
            }
        }
    }

    let stats = pipeline.stats();
    eprintln!(
        "frames_received={} frames_valid={} frames_crc_error={} bytes_received={} sync_timeouts={} frame_drops={}",
        stats.frames_received,
        stats.frames_valid,
        stats.frames_crc_error,
        stats.bytes_received,
        stats.sync_timeouts,
        stats.frame_drops,
    );

    Ok(())
}
