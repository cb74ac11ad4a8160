use std::{
    error::Error,
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use clap::Parser;
use gemm_analysis::{parse_log, render_table, summarize};

/// Summarize perf counter tables by matrix size and method.
///
/// Reads the perf driver's output from stdin, e.g.
/// `./perf_driver | perf-summary`.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Read the log from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,
}

fn run<R: BufRead, W: Write>(input: R, out: &mut W) -> Result<(), Box<dyn Error>> {
    let rows = parse_log(input)?;
    if rows.is_empty() {
        writeln!(out, "No data found.")?;
        return Ok(());
    }
    write!(out, "{}", render_table(&summarize(&rows)))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut stdout = io::stdout().lock();
    match &cli.input {
        Some(path) => run(BufReader::new(File::open(path)?), &mut stdout),
        None => run(io::stdin().lock(), &mut stdout),
    }
}
