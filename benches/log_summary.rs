use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use gemm_analysis::{parse_log, render_table, summarize};

const METHODS: [&str; 4] = ["NAIVE", "BLOCKED", "SIMD", "SIMD_BLOCKED"];

// A perf driver log with a few header lines and `runs` samples per (size, method).
fn generate_log(runs: u64) -> String {
    let mut log = String::from("SIZE | METHOD | L1D_MISS | LLC_MISS | INSTR | CYCLES\n");
    log.push_str("-----+--------+----------+----------+-------+-------\n");
    for size in (2..=11).map(|p| 1u64 << p) {
        for (i, method) in METHODS.iter().enumerate() {
            for run in 0..runs {
                let l1d = size * size / (i as u64 + 1) + run;
                log.push_str(&format!(
                    "{:>5} | {:<12} | {:>10} | {:>8} | {:>12} | {:>12}\n",
                    size,
                    method,
                    l1d,
                    l1d / 16,
                    size * size * size * 2,
                    size * size * size / (i as u64 + 1) + run
                ));
            }
        }
    }
    log
}

fn bench_parse(c: &mut Criterion) {
    let log = generate_log(50);
    let mut group = c.benchmark_group("perf_log");
    group.throughput(Throughput::Bytes(log.len() as u64));
    group.bench_function("parse_log", |b| {
        b.iter(|| parse_log(Cursor::new(black_box(log.as_bytes()))).unwrap())
    });
    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let rows = parse_log(Cursor::new(generate_log(50).into_bytes())).unwrap();
    c.bench_function("summarize", |b| b.iter(|| summarize(black_box(&rows))));
    c.bench_function("summarize_and_render", |b| {
        b.iter(|| render_table(&summarize(black_box(&rows))))
    });
}

criterion_group!(benches, bench_parse, bench_summarize);
criterion_main!(benches);
