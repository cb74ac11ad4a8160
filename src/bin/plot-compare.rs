use std::{
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use gemm_analysis::{
    comparison_series, concat_variants, load_variant, render_comparison, BenchmarkRecord, Variant,
    DEFAULT_METRIC,
};

/// Compare SSE2 and AVX2 benchmark runs on one chart.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Results CSV from the SSE2 build
    sse_csv: PathBuf,

    /// Results CSV from the AVX2 build
    avx_csv: PathBuf,

    /// Throughput column to plot
    #[arg(long, default_value = DEFAULT_METRIC)]
    metric: String,
}

impl Cli {
    fn output_file(&self) -> PathBuf {
        PathBuf::from(format!("comparison_{}.png", self.metric))
    }
}

fn load_or_exit(path: &Path, metric: &str, variant: Variant) -> Vec<BenchmarkRecord<f64>> {
    match load_variant(path, metric, variant) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let sse = load_or_exit(&cli.sse_csv, &cli.metric, Variant::Sse2);
    let avx = load_or_exit(&cli.avx_csv, &cli.metric, Variant::Avx2);
    let total = concat_variants(sse, avx);

    let output = cli.output_file();
    if let Err(e) = render_comparison(&output, &cli.metric, &comparison_series(&total)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    println!("Comparison graph saved to {}", output.display());
}
