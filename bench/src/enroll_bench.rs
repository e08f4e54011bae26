use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use facevault_core::{FaceRegistry, RegistryConfig};

use crate::{deterministic_vector, summarize_ms};

const ENROLL_COUNT: usize = 512;
const DIMENSION: usize = 128;
const WARMUP_RUNS: usize = 1;
const MEASURED_RUNS: usize = 5;

struct RunStats {
    elapsed: Duration,
    latencies_ms: Vec<f64>,
    document_bytes: u64,
}

pub(crate) fn run_enroll_bench(mode: &str) -> bool {
    let root = temp_root();
    for sync_on_write in [false, true] {
        for _ in 0..WARMUP_RUNS {
            if run_enroll_once(&root, sync_on_write).is_none() {
                clean_root(&root);
                return false;
            }
        }

        let mut latencies_ms = Vec::with_capacity(MEASURED_RUNS * ENROLL_COUNT);
        let mut total_duration = Duration::from_secs(0);
        let mut document_bytes = 0u64;
        for _ in 0..MEASURED_RUNS {
            let Some(stats) = run_enroll_once(&root, sync_on_write) else {
                clean_root(&root);
                return false;
            };
            latencies_ms.extend(stats.latencies_ms);
            total_duration += stats.elapsed;
            document_bytes = stats.document_bytes;
        }

        let (p50_ms, p95_ms, avg_ms) = summarize_ms(&latencies_ms);
        let ops = (MEASURED_RUNS * ENROLL_COUNT) as f64;
        let qps = ops / total_duration.as_secs_f64();
        println!(
            "bench=enroll mode={mode} sync_on_write={sync_on_write} enrollments={ENROLL_COUNT} dimension={DIMENSION} warmup_runs={WARMUP_RUNS} measured_runs={MEASURED_RUNS} p50_ms={p50_ms:.6} p95_ms={p95_ms:.6} avg_ms={avg_ms:.6} qps={qps:.2} document_bytes={document_bytes}"
        );
    }

    clean_root(&root);
    true
}

fn run_enroll_once(root: &Path, sync_on_write: bool) -> Option<RunStats> {
    clean_root(root);
    let mut config = RegistryConfig::in_data_dir(root);
    config.sync_on_write = sync_on_write;
    let registry = match FaceRegistry::open(config) {
        Ok(registry) => registry,
        Err(error) => {
            eprintln!(
                "error=enroll_bench_setup_failed root={} detail=\"{error}\"",
                root.display()
            );
            return None;
        }
    };

    let mut latencies_ms = Vec::with_capacity(ENROLL_COUNT);
    let started_at = Instant::now();
    for id in 0..ENROLL_COUNT {
        let name = format!("person-{}", id % 64);
        let embedding = deterministic_vector(id as u64 + 1, DIMENSION);
        let write_started = Instant::now();
        if let Err(error) = registry.enroll(&name, &embedding, None) {
            eprintln!("error=enroll_failed id={id} detail=\"{error}\"");
            return None;
        }
        latencies_ms.push(write_started.elapsed().as_secs_f64() * 1_000.0);
    }
    let elapsed = started_at.elapsed();

    let document_bytes = fs::metadata(registry.path())
        .map(|metadata| metadata.len())
        .unwrap_or(0);
    Some(RunStats {
        elapsed,
        latencies_ms,
        document_bytes,
    })
}

fn temp_root() -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "facevault_enroll_bench_{}_{stamp}",
        std::process::id()
    ))
}

fn clean_root(root: &Path) {
    if root.exists() {
        if let Err(error) = fs::remove_dir_all(root) {
            eprintln!(
                "warn=bench_cleanup_failed root={} detail=\"{error}\"",
                root.display()
            );
        }
    }
}
