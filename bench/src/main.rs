#![forbid(unsafe_code)]
//! Matching and enrollment benchmarks for FaceVault.
//!
//! Scenarios:
//! - `match`: linear best-match scan over an in-memory store
//! - `enroll`: enrollment throughput against a temp face document

use std::env;
use std::process;
use std::time::{Duration, Instant};

use facevault_core::{best_match, FaceRecord, DEFAULT_MATCH_THRESHOLD};

mod enroll_bench;

const DIMENSION: usize = 128;
const STORE_SIZE: usize = 10_000;
const IDENTITIES: usize = 500;
const WARMUP_RUNS: usize = 8;
const MEASURED_RUNS: usize = 50;

fn main() {
    if cfg!(debug_assertions) && env::var("FACEVAULT_ALLOW_DEBUG_BENCH").as_deref() != Ok("1") {
        eprintln!(
            "error=debug_build_not_allowed message=\"run `cargo run --release -p facevault-bench`\""
        );
        process::exit(2);
    }

    let mode = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    let scenario = env::var("FACEVAULT_BENCH_SCENARIO").unwrap_or_else(|_| "all".to_string());
    let ok = match scenario.as_str() {
        "all" => run_match_bench(mode) && enroll_bench::run_enroll_bench(mode),
        "match" => run_match_bench(mode),
        "enroll" => enroll_bench::run_enroll_bench(mode),
        _ => {
            eprintln!(
                "error=invalid_scenario scenario=\"{}\" allowed=\"all,match,enroll\"",
                scenario
            );
            false
        }
    };

    if !ok {
        process::exit(1);
    }
}

fn run_match_bench(mode: &str) -> bool {
    let Some(records) = generate_store(STORE_SIZE, DIMENSION) else {
        return false;
    };
    let query = deterministic_vector(42, DIMENSION);

    for _ in 0..WARMUP_RUNS {
        run_match_once(&records, &query);
    }

    let mut elapsed_samples = Vec::with_capacity(MEASURED_RUNS);
    let mut total_duration = Duration::from_secs(0);
    let mut last_name = String::from("-");
    let mut last_score = f32::NAN;

    for _ in 0..MEASURED_RUNS {
        let (elapsed, found) = run_match_once(&records, &query);
        elapsed_samples.push(elapsed.as_secs_f64() * 1_000.0);
        total_duration += elapsed;
        if let Some(found) = found {
            last_name = found.name;
            last_score = found.score;
        }
    }

    let (p50_ms, p95_ms, avg_ms) = summarize_ms(&elapsed_samples);
    let total_ops = (MEASURED_RUNS * STORE_SIZE) as f64;
    let comparisons_per_sec = total_ops / total_duration.as_secs_f64();

    println!(
        "bench=match_scan mode={mode} samples={STORE_SIZE} identities={IDENTITIES} dimension={DIMENSION} warmup_runs={WARMUP_RUNS} measured_runs={MEASURED_RUNS} p50_ms={p50_ms:.6} p95_ms={p95_ms:.6} avg_ms={avg_ms:.6} comparisons_per_sec={comparisons_per_sec:.2} best_name={last_name} best_score={last_score:.6}"
    );

    true
}

fn run_match_once(
    records: &[FaceRecord],
    query: &[f32],
) -> (Duration, Option<facevault_core::FaceMatch>) {
    let started_at = Instant::now();
    let found = best_match(records, query, DEFAULT_MATCH_THRESHOLD);
    (started_at.elapsed(), found)
}

fn generate_store(size: usize, dimension: usize) -> Option<Vec<FaceRecord>> {
    let mut records = Vec::with_capacity(size);
    for id in 0..size {
        let name = format!("person-{}", id % IDENTITIES);
        let embedding = deterministic_vector(id as u64 + 1, dimension);
        match FaceRecord::new(&name, &embedding, None) {
            Ok(record) => records.push(record),
            Err(error) => {
                eprintln!("error=store_generation_failed id={id} detail=\"{error}\"");
                return None;
            }
        }
    }
    Some(records)
}

pub(crate) fn summarize_ms(samples_ms: &[f64]) -> (f64, f64, f64) {
    let p50_ms = percentile_ms(samples_ms, 0.50);
    let p95_ms = percentile_ms(samples_ms, 0.95);
    let avg_ms = samples_ms.iter().sum::<f64>() / samples_ms.len().max(1) as f64;
    (p50_ms, p95_ms, avg_ms)
}

fn percentile_ms(samples_ms: &[f64], quantile: f64) -> f64 {
    if samples_ms.is_empty() {
        return 0.0;
    }

    let mut sorted = samples_ms.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last_index = sorted.len().saturating_sub(1);
    let position = (quantile.clamp(0.0, 1.0) * last_index as f64).round() as usize;
    sorted[position]
}

pub(crate) fn deterministic_vector(seed: u64, dimension: usize) -> Vec<f32> {
    (0..dimension)
        .map(|index| {
            let mixed = (seed as usize)
                .wrapping_mul(31)
                .wrapping_add(index.wrapping_mul(17))
                % 10_000;
            (mixed as f32 + 1.0) / 10_000.0 - 0.5
        })
        .collect()
}
