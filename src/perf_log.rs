//! Parser for the performance counter table printed by the perf driver.
//!
//! Each data row has six pipe-separated fields:
//!
//! ```text
//!    4 | NAIVE      |          29 |       5 |     100 |     200
//! SIZE | METHOD     |    L1D_MISS | LLC_MISS|   INSTR |  CYCLES
//! ```
//!
//! Anything else in the log (headers, separators, progress output) is skipped.

use std::{io::BufRead, sync::OnceLock};

use log::debug;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfRow {
    pub size: u64,
    pub method: String,
    pub l1d_miss: u64,
    pub llc_miss: u64,
    pub instructions: u64,
    pub cycles: u64,
}

fn row_pattern() -> &'static Regex {
    static ROW_PATTERN: OnceLock<Regex> = OnceLock::new();
    ROW_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*\|\s*(\w+)\s*\|\s*(\d+)\s*\|\s*(\d+)\s*\|\s*(\d+)\s*\|\s*(\d+)")
            .expect("row pattern is a valid regex")
    })
}

/// Parse one table row. Returns `None` for lines that are not data rows,
/// including rows whose counters do not fit in a `u64`.
pub fn parse_line(line: &str) -> Option<PerfRow> {
    let caps = row_pattern().captures(line)?;
    Some(PerfRow {
        size: caps[1].parse().ok()?,
        method: caps[2].to_string(),
        l1d_miss: caps[3].parse().ok()?,
        llc_miss: caps[4].parse().ok()?,
        instructions: caps[5].parse().ok()?,
        cycles: caps[6].parse().ok()?,
    })
}

/// Collect every data row from `reader`, in input order.
///
/// Lines are decoded lossily, so a stray non-UTF-8 line is skipped like any
/// other noise instead of aborting the read.
pub fn parse_log<R: BufRead>(mut reader: R) -> std::io::Result<Vec<PerfRow>> {
    let mut rows = Vec::new();
    let mut buf = Vec::new();
    let mut lineno = 0;
    while reader.read_until(b'\n', &mut buf)? > 0 {
        lineno += 1;
        let line = String::from_utf8_lossy(&buf);
        match parse_line(&line) {
            Some(row) => rows.push(row),
            None => debug!("skipping line {}: {:?}", lineno, line.trim_end()),
        }
        buf.clear();
    }
    Ok(rows)
}
