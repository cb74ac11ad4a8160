//! Offline post-processing for the matrix multiplication benchmarks.
//!
//! Three pipelines share this library:
//!
//! - **perf-summary**: parses the pipe-delimited performance counter table the
//!   perf driver prints and reports per (size, method) statistics.
//! - **plot-scaling**: plots one benchmark CSV as throughput vs. matrix size.
//! - **plot-compare**: overlays two benchmark CSVs (SSE2 and AVX2 builds).

use std::{error::Error, fmt::Display, io};

pub mod chart;
pub mod perf_log;
pub mod records;
pub mod summary;
#[cfg(test)]
mod test_utils;

pub use chart::{comparison_series, render_comparison, render_scaling, scaling_series, Series};
pub use perf_log::{parse_line, parse_log, PerfRow};
pub use records::{
    concat_variants, extract_method_size, load_records, load_variant, BenchmarkRecord, Variant,
};
pub use summary::{render_table, summarize, SummaryRow};

/// Throughput column plotted when none is given on the command line.
pub const DEFAULT_METRIC: &str = "GOps";

#[derive(Debug)]
pub enum AnalysisError {
    Io(io::Error),
    Csv(csv::Error),
    MissingColumn(String),
    Plot(String),
}

impl Error for AnalysisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AnalysisError::Io(e) => Some(e),
            AnalysisError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::Io(e) => write!(f, "{}", e),
            AnalysisError::Csv(e) => write!(f, "{}", e),
            AnalysisError::MissingColumn(column) => write!(f, "missing column '{}'", column),
            AnalysisError::Plot(msg) => write!(f, "failed to render chart: {}", msg),
        }
    }
}

impl From<io::Error> for AnalysisError {
    fn from(e: io::Error) -> Self {
        AnalysisError::Io(e)
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(e: csv::Error) -> Self {
        AnalysisError::Csv(e)
    }
}

/// Round `value` to `digits` decimal places, ties to even.
///
/// NaN and infinities pass through unchanged.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}
