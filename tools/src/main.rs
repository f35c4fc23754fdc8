//! load-runner: host runtime for the synthetic transaction loader.
//!
//! Usage:
//!   load-runner --db load.db --workers 4 --passes 10 --seed 42
//!   load-runner --db load.db --args args.json
//!
//! Each worker owns its store connection, its RNG stream, and its
//! data subdirectory; workers share nothing mutable. One pass =
//! generate -> parse -> pipeline. Retry policy lives here, not in
//! the core: a failed pass stops that worker.

mod generator;

use std::env;
use std::thread;

use anyhow::{Context, Result};
use txnload_core::{
    config::LoaderConfig,
    parser::RecordStream,
    pipeline::{PassSummary, Pipeline},
    rng::WorkerRng,
    store::LoadStore,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let workers = parse_arg(&args, "--workers", 1u64);
    let passes = parse_arg(&args, "--passes", 1u64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("load.db")
        .to_string();

    let cfg = load_config(&args)?;

    println!("txnload — load-runner");
    println!("  seed:       {seed}");
    println!("  workers:    {workers}");
    println!("  passes:     {passes}");
    println!("  db:         {db}");
    println!("  batch_size: {}", cfg.batch_size);
    println!("  update_freq:{}", cfg.update_freq);
    println!();

    // Schema once, up front; each worker then gets its own exclusive
    // connection to the same database.
    let store = LoadStore::open(&db)?;
    store.migrate()?;

    let mut handles = Vec::new();
    for worker_id in 0..workers {
        let cfg = cfg.clone();
        let worker_store = store.reopen()?;
        handles.push(thread::spawn(move || {
            run_worker(worker_id, seed, passes, worker_store, &cfg)
        }));
    }

    let mut failed = false;
    for (worker_id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::error!("worker {worker_id} failed: {e:#}");
                failed = true;
            }
            Err(_) => {
                log::error!("worker {worker_id} panicked");
                failed = true;
            }
        }
    }
    if failed {
        anyhow::bail!("one or more workers failed");
    }
    Ok(())
}

fn run_worker(
    worker_id: u64,
    seed: u64,
    passes: u64,
    store: LoadStore,
    cfg: &LoaderConfig,
) -> Result<()> {
    for pass in 0..passes {
        let data_dir = generator::generate(cfg, worker_id, pass)
            .with_context(|| format!("worker {worker_id} pass {pass}: generator"))?;

        let records = RecordStream::from_dir(&data_dir)
            .with_context(|| format!("worker {worker_id} pass {pass}: reading data dir"))?;

        // Fresh accumulators per pass; the RNG stream advances across
        // passes so flush policies do not repeat.
        let rng = WorkerRng::new(seed.wrapping_add(pass), worker_id);
        let mut pipeline = Pipeline::new(&store, cfg, rng);
        let summary = pipeline
            .run(records)
            .with_context(|| format!("worker {worker_id} pass {pass}: pipeline"))?;

        log_summary(worker_id, pass, &summary);
    }
    Ok(())
}

fn log_summary(worker_id: u64, pass: u64, summary: &PassSummary) {
    log::info!(
        "worker {worker_id} pass {pass}: {} records",
        summary.records
    );
    for totals in &summary.entities {
        log::info!(
            "worker {worker_id} pass {pass}: {:<12} {:>6} rows in {:>4} flushes",
            totals.entity,
            totals.rows,
            totals.flushes
        );
    }
}

/// Config comes from `--args <file.json>` (a flat object of the
/// recognized keys, the shape the original host passed); absent keys
/// fall back to the defaults.
fn load_config(args: &[String]) -> Result<LoaderConfig> {
    let cfg = match args.windows(2).find(|w| w[0] == "--args") {
        Some(w) => {
            let text = std::fs::read_to_string(&w[1])
                .with_context(|| format!("reading args file {}", w[1]))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", w[1]))?
        }
        None => LoaderConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
