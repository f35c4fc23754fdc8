//! External generator invocation (glue, one call per pass).
//!
//! The Sparkov generator is a black box: it is handed a customer
//! count and a date window and leaves pipe-delimited CSVs in the
//! worker's data directory. The window advances by `days` on each
//! successive pass so transaction history keeps moving forward.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local};
use txnload_core::config::LoaderConfig;

const DATE_FMT: &str = "%m-%d-%Y";

/// Wipe and regenerate one worker's data directory for one pass.
/// Returns the directory the parser should read.
pub fn generate(cfg: &LoaderConfig, worker_id: u64, pass: u64) -> Result<PathBuf> {
    let out_dir = PathBuf::from(&cfg.data_folder).join(worker_id.to_string());
    if out_dir.exists() {
        std::fs::remove_dir_all(&out_dir)
            .with_context(|| format!("clearing {}", out_dir.display()))?;
    }

    let start_days_ahead = (cfg.days * pass as i64) + 1;
    let start = Local::now() + Duration::days(start_days_ahead);
    let end = start + Duration::days(cfg.days);

    let status = Command::new("python3")
        .arg("./datagen.py")
        .arg("-n")
        .arg(cfg.customers.to_string())
        .arg("-o")
        .arg(&out_dir)
        .arg(start.format(DATE_FMT).to_string())
        .arg(end.format(DATE_FMT).to_string())
        .current_dir(&cfg.generator_location)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("spawning generator in {}", cfg.generator_location))?;

    if !status.success() {
        bail!("generator exited with {status}");
    }
    Ok(out_dir)
}
