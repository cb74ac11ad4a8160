//! Benchmark result CSVs.
//!
//! The benchmark harness writes one row per run with a composite `name`
//! column such as `Simd/2048`. Method and matrix size are recovered from that
//! column; rows where this fails carry no usable x coordinate and are dropped.

use std::{collections::BTreeMap, fmt::Display, path::Path, str::FromStr, sync::OnceLock};

use log::{debug, info};
use regex::Regex;

use crate::AnalysisError;

const NAME_COLUMN: &str = "name";

/// Instruction-set build a result file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    Sse2,
    Avx2,
}

impl Variant {
    pub fn label(self) -> &'static str {
        match self {
            Variant::Sse2 => "SSE2",
            Variant::Avx2 => "AVX2",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One CSV row with its derived method and size.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord<S> {
    pub name: String,
    pub method: String,
    pub size: S,
    pub metric: f64,
    pub variant: Option<Variant>,
    /// Every other column, untouched.
    pub columns: BTreeMap<String, String>,
}

impl<S> BenchmarkRecord<S> {
    /// Legend label, `"Method (Variant)"` once the record has been tagged.
    pub fn implementation(&self) -> String {
        match self.variant {
            Some(variant) => format!("{} ({})", self.method, variant),
            None => self.method.clone(),
        }
    }
}

fn name_pattern() -> &'static Regex {
    static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
    NAME_PATTERN
        .get_or_init(|| Regex::new(r"([a-zA-Z0-9_]+)/(\d+)").expect("name pattern is a valid regex"))
}

/// Split a benchmark name like `Simd/2048` into method and size.
///
/// The first `<identifier>/<digits>` occurrence anywhere in the name is used.
pub fn extract_method_size<S: FromStr>(name: &str) -> Option<(String, S)> {
    let caps = name_pattern().captures(name)?;
    let size = caps[2].parse().ok()?;
    Some((caps[1].to_string(), size))
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, AnalysisError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| AnalysisError::MissingColumn(column.to_string()))
}

/// Read a benchmark CSV, keeping rows with a parseable name and metric.
pub fn load_records<S: FromStr>(
    path: impl AsRef<Path>,
    metric: &str,
) -> Result<Vec<BenchmarkRecord<S>>, AnalysisError> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, NAME_COLUMN)?;
    let metric_idx = column_index(&headers, metric)?;

    let mut records = Vec::new();
    let mut dropped = 0;
    for result in reader.records() {
        let row = result?;
        let name = row.get(name_idx).unwrap_or_default();

        let Some((method, size)) = extract_method_size::<S>(name) else {
            debug!("dropping {:?}: no <method>/<size> in name", name);
            dropped += 1;
            continue;
        };
        let Ok(value) = row.get(metric_idx).unwrap_or_default().trim().parse::<f64>() else {
            debug!("dropping {:?}: no numeric {}", name, metric);
            dropped += 1;
            continue;
        };

        let columns = headers
            .iter()
            .zip(row.iter())
            .enumerate()
            .filter(|(i, _)| *i != name_idx && *i != metric_idx)
            .map(|(_, (h, v))| (h.to_string(), v.to_string()))
            .collect();

        records.push(BenchmarkRecord {
            name: name.to_string(),
            method,
            size,
            metric: value,
            variant: None,
            columns,
        });
    }

    info!(
        "loaded {} records from {} ({} dropped)",
        records.len(),
        path.display(),
        dropped
    );
    Ok(records)
}

/// Load one variant's result file and tag every row with `variant`.
pub fn load_variant(
    path: impl AsRef<Path>,
    metric: &str,
    variant: Variant,
) -> Result<Vec<BenchmarkRecord<f64>>, AnalysisError> {
    let mut records = load_records::<f64>(path, metric)?;
    for record in &mut records {
        record.variant = Some(variant);
    }
    Ok(records)
}

/// Variant A rows followed by variant B rows.
pub fn concat_variants<S>(
    mut a: Vec<BenchmarkRecord<S>>,
    b: Vec<BenchmarkRecord<S>>,
) -> Vec<BenchmarkRecord<S>> {
    a.extend(b);
    a
}
