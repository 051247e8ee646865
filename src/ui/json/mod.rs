//! NDJSON output for `--json`
//!
//! One event per line on stdout: `start`, one `package` per input in input
//! order, then `complete` (or a single `error` when the run is rejected).

pub mod events;

use serde::Serialize;
use std::io::{self, Write};

/// Write a typed event as one NDJSON line
pub fn write_event<T: Serialize>(out: &mut impl Write, event: &T) -> io::Result<()> {
    let json =
        serde_json::to_string(event).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    out.write_all(json.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

pub fn emit_event<T: Serialize>(event: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, event)
}
