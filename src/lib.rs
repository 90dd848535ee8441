pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod model;
pub mod parser;
pub mod processor;
pub mod rules;
pub mod writer;

#[cfg(test)]
mod test_utils;

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env, Target};

use diagnostics::Diagnostics;
use manifest::Manifest;
use processor::BuildReport;

/// Parse the command line, build everything and report the totals.
///
/// Returns `Ok(false)` when the run finished but recorded errors.
pub fn run() -> anyhow::Result<bool> {
    let args = cli::Cli::parse();

    // 1. ── Manifest ───────────────────────────────────────────────────
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Reading manifest {}", args.manifest.display()))?;

    // 2. ── Logging ────────────────────────────────────────────────────
    init_logging(manifest.log_path().as_deref())?;

    // 3. ── Build ──────────────────────────────────────────────────────
    let report = match compile(&manifest) {
        Ok(report) => report,
        Err(e) => {
            log::error!("build aborted: {e:#}");
            return Err(e);
        }
    };

    log::info!(
        "{} file(s) written, {} warning(s), {} error(s)",
        report.files.len(),
        report.warnings,
        report.errors
    );
    Ok(report.success())
}

/// Compile everything `manifest` names with a fresh diagnostics sink.
pub fn compile(manifest: &Manifest) -> anyhow::Result<BuildReport> {
    let mut diag = Diagnostics::new();
    processor::build(manifest, &mut diag).with_context(|| "Building resources")
}

/// Route the `log` facade to standard output, or to `log_file` when set.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Opening log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(Target::Stdout);
        }
    }
    builder.try_init().with_context(|| "Installing logger")?;
    Ok(())
}
