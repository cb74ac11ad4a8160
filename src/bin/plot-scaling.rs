use std::{path::PathBuf, process};

use clap::Parser;
use gemm_analysis::{load_records, render_scaling, scaling_series, DEFAULT_METRIC};

/// Plot benchmark throughput against matrix size, one line per method.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Benchmark results CSV with a `name` column like `Simd/2048`
    #[arg(default_value = "results.csv")]
    csv_path: PathBuf,

    /// Throughput column to plot
    #[arg(long, default_value = DEFAULT_METRIC)]
    metric: String,
}

impl Cli {
    fn output_file(&self) -> PathBuf {
        PathBuf::from(format!("benchmark_graph_{}.png", self.metric))
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let records = match load_records::<u64>(&cli.csv_path, &cli.metric) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error reading CSV: {}", e);
            process::exit(1);
        }
    };

    let output = cli.output_file();
    if let Err(e) = render_scaling(&output, &cli.metric, &scaling_series(&records)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    println!("Graph saved to {}", output.display());
}
