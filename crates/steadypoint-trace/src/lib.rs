//! Line-delimited JSON trace format
//!
//! A trace is a header record followed by one record per fixed step:
//!
//! ```text
//! {"type":"header","sample_rate_hz":60,"run_id":"r-01","source_app":"demo"}
//! {"type":"tick","tick":0,"x":0.0,"y":0.0,"dx":0.0,"dy":0.0,"buttons":0}
//! {"type":"tick","tick":1,"x":1.5,"y":0.2,"dx":1.5,"dy":0.2,"buttons":1}
//! ```
//!
//! Readers tolerate blank lines and unknown record types. A non-header
//! first record, a missing required field in the header, or an unsupported
//! sample rate is a single failure; malformed lines after the header are
//! skipped and counted.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use thiserror::Error;

/// Button bitmask: primary button.
pub const BUTTON_PRIMARY: u8 = 1 << 0;
/// Button bitmask: secondary button.
pub const BUTTON_SECONDARY: u8 = 1 << 1;

/// Errors surfaced by trace reading and writing.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Underlying I/O failure.
    #[error("trace I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream had no records at all.
    #[error("trace is empty")]
    Empty,

    /// The first record was not a header.
    #[error("first record is not a header: {0}")]
    MissingHeader(String),

    /// The header was present but unusable.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Serialization failure while writing.
    #[error("trace encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Trace header record (first line of every trace).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Fixed sample rate the ticks were recorded at.
    pub sample_rate_hz: u32,
    /// Identifier of the recording run.
    pub run_id: String,
    /// Application the pointer traffic was captured from.
    pub source_app: String,
}

/// One per-step trace record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceTick {
    /// Fixed-step index.
    pub tick: u32,
    /// Cursor position, vpx.
    pub x: f32,
    /// Cursor position, vpx.
    pub y: f32,
    /// Per-step delta, vpx/step.
    pub dx: f32,
    /// Per-step delta, vpx/step.
    pub dy: f32,
    /// Button bitmask: bit 0 primary, bit 1 secondary.
    pub buttons: u8,
}

impl TraceTick {
    /// Primary button held at this tick.
    #[must_use]
    pub fn primary_down(&self) -> bool {
        self.buttons & BUTTON_PRIMARY != 0
    }

    /// Secondary button held at this tick.
    #[must_use]
    pub fn secondary_down(&self) -> bool {
        self.buttons & BUTTON_SECONDARY != 0
    }
}

/// A fully read trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Header record.
    pub header: TraceHeader,
    /// Every well-formed tick, in file order.
    pub ticks: Vec<TraceTick>,
    /// Malformed or unknown lines skipped after the header.
    pub skipped_lines: u64,
}

/// Wire shape of a record line; unknown `type` values fall out of the enum
/// and are skipped by the reader.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Record {
    Header(TraceHeader),
    Tick(TraceTick),
}

/// Read a trace from a buffered reader.
///
/// The first non-blank line must be a header record; any later line that
/// is blank, malformed or of an unknown type is skipped and counted.
pub fn read_trace<R: BufRead>(reader: R) -> Result<Trace, TraceError> {
    let mut lines = reader.lines();

    let header = loop {
        let Some(line) = lines.next() else {
            return Err(TraceError::Empty);
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(&line) {
            Ok(Record::Header(header)) => {
                if header.sample_rate_hz == 0 {
                    return Err(TraceError::InvalidHeader(
                        "sample_rate_hz must be > 0".to_string(),
                    ));
                }
                break header;
            }
            Ok(Record::Tick(_)) | Err(_) => {
                return Err(TraceError::MissingHeader(line));
            }
        }
    };

    let mut ticks = Vec::new();
    let mut skipped_lines = 0u64;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(&line) {
            Ok(Record::Tick(tick)) => ticks.push(tick),
            Ok(Record::Header(_)) | Err(_) => skipped_lines += 1,
        }
    }

    Ok(Trace {
        header,
        ticks,
        skipped_lines,
    })
}

/// Write a trace: header line first, then one line per tick.
pub fn write_trace<W: Write>(
    writer: &mut W,
    header: &TraceHeader,
    ticks: &[TraceTick],
) -> Result<(), TraceError> {
    let header_line = serde_json::to_string(&Record::Header(header.clone()))?;
    writeln!(writer, "{header_line}")?;
    for tick in ticks {
        let line = serde_json::to_string(&Record::Tick(*tick))?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
