use std::{collections::BTreeMap, fmt};

use log::info;

use crate::{perf_log::PerfRow, round_to};

/// Aggregated counters for one (size, method) group.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub size: u64,
    pub method: String,
    pub samples: usize,
    pub l1d_mean: f64,
    pub l1d_min: u64,
    pub l1d_std: f64,
    pub llc_mean: f64,
    pub cycles_mean: f64,
    pub instructions_mean: f64,
    pub ipc: f64,
}

const HEADERS: [&str; 9] = [
    "SIZE",
    "METHOD",
    "L1D_MISS mean",
    "L1D_MISS min",
    "L1D_MISS std",
    "LLC_MISS mean",
    "CYCLES mean",
    "INSTR mean",
    "IPC",
];

fn mean(values: &[u64]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

// Sample standard deviation; a single sample gives 0/0 = NaN.
fn std_dev(values: &[u64], mean: f64) -> f64 {
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    variance.sqrt()
}

impl SummaryRow {
    fn from_group(size: u64, method: String, rows: &[&PerfRow]) -> Self {
        let l1d: Vec<u64> = rows.iter().map(|r| r.l1d_miss).collect();
        let llc: Vec<u64> = rows.iter().map(|r| r.llc_miss).collect();
        let cycles: Vec<u64> = rows.iter().map(|r| r.cycles).collect();
        let instructions: Vec<u64> = rows.iter().map(|r| r.instructions).collect();

        let l1d_mean = mean(&l1d);
        let cycles_mean = round_to(mean(&cycles), 1);
        let instructions_mean = round_to(mean(&instructions), 1);

        Self {
            size,
            method,
            samples: rows.len(),
            l1d_mean: round_to(l1d_mean, 1),
            l1d_min: l1d.iter().copied().min().unwrap_or_default(),
            l1d_std: round_to(std_dev(&l1d, l1d_mean), 1),
            llc_mean: round_to(mean(&llc), 1),
            cycles_mean,
            instructions_mean,
            // from the displayed (rounded) means
            ipc: round_to(instructions_mean / cycles_mean, 2),
        }
    }

    fn cells(&self) -> [String; 9] {
        [
            self.size.to_string(),
            self.method.clone(),
            format!("{:.1}", self.l1d_mean),
            self.l1d_min.to_string(),
            format!("{:.1}", self.l1d_std),
            format!("{:.1}", self.llc_mean),
            format!("{:.1}", self.cycles_mean),
            format!("{:.1}", self.instructions_mean),
            format!("{:.2}", self.ipc),
        ]
    }
}

impl fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cells().join(" | "))
    }
}

/// Group rows by (size, method) and aggregate each group.
///
/// Groups come out ordered by size, then method name.
pub fn summarize(rows: &[PerfRow]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(u64, &str), Vec<&PerfRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.size, row.method.as_str()))
            .or_default()
            .push(row);
    }
    info!("grouped {} rows into {} groups", rows.len(), groups.len());

    groups
        .into_iter()
        .map(|((size, method), group)| SummaryRow::from_group(size, method.to_string(), &group))
        .collect()
}

/// Lay the summary out as a fixed-width table. Column widths grow to fit the
/// widest value so nothing is truncated.
pub fn render_table(rows: &[SummaryRow]) -> String {
    let body: Vec<[String; 9]> = rows.iter().map(SummaryRow::cells).collect();

    let mut widths = HEADERS.map(str::len);
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                // method is the only text column
                if i == 1 {
                    format!("{:<width$}", cell)
                } else {
                    format!("{:>width$}", cell)
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = format_line(&header);
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1)));
    out.push('\n');
    for cells in &body {
        out.push_str(&format_line(cells));
        out.push('\n');
    }
    out
}
