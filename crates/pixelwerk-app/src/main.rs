// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixelwerk — batch image-transform runner.
//
// Entry point. Initialises logging, loads the pipeline configuration, and runs
// each input on a blocking worker, at most `--jobs` at a time.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pixelwerk_core::error::Result;
use pixelwerk_core::PipelineConfig;
use pixelwerk_transform::Pipeline;
use tokio::sync::Semaphore;

use services::batch;

/// Run the fixed transform battery over PNG images.
#[derive(Debug, Parser)]
#[command(name = "pixelwerk", version, about)]
struct Cli {
    /// Pipeline configuration (JSON). Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reproduce the legacy output bit for bit (legacy channel test, wrapping subtraction)
    #[arg(long, conflicts_with = "config")]
    legacy: bool,

    /// Output directory; each input gets a sub-directory named after its stem
    #[arg(short, long)]
    out: PathBuf,

    /// Number of inputs processed at once (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Input PNG file(s)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn load_pipeline(config: Option<&PathBuf>, legacy: bool) -> Result<Pipeline> {
    let config = match config {
        Some(path) => PipelineConfig::load(path)?,
        None if legacy => PipelineConfig::legacy(),
        None => PipelineConfig::default(),
    };
    Pipeline::new(config)
}

/// Worker cap for `--jobs`; zero means one worker per available CPU.
fn worker_limit(jobs: usize) -> usize {
    let jobs = if jobs > 0 {
        jobs
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    };
    jobs.min(Semaphore::MAX_PERMITS)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(inputs = cli.inputs.len(), "Pixelwerk starting");

    let pipeline = match load_pipeline(cli.config.as_ref(), cli.legacy) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            tracing::error!(error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };

    let limit = worker_limit(cli.jobs);
    let permits = Arc::new(Semaphore::new(limit));
    let dirs = batch::output_dirs(&cli.out, &cli.inputs);
    tracing::debug!(workers = limit, "Worker limit set");

    let mut workers = Vec::with_capacity(cli.inputs.len());
    for (input, dir) in cli.inputs.into_iter().zip(dirs) {
        // Waits here while `limit` inputs are already in flight.
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(error = %e, "worker pool closed");
                return ExitCode::FAILURE;
            }
        };
        let pipeline = Arc::clone(&pipeline);
        let display = input.display().to_string();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            batch::process_input(&pipeline, &input, &dir)
        });
        workers.push((display, handle));
    }

    let mut rejected = 0usize;
    for (input, handle) in workers {
        match handle.await {
            Ok(Ok(manifest)) => {
                tracing::info!(
                    input = %input,
                    run_id = %manifest.run_id,
                    written = manifest.entries.len(),
                    "done"
                );
            }
            Ok(Err(e)) => {
                tracing::error!(input = %input, error = %e, "input rejected");
                rejected += 1;
            }
            Err(e) => {
                tracing::error!(input = %input, error = %e, "worker failed");
                rejected += 1;
            }
        }
    }

    if rejected > 0 {
        tracing::warn!(rejected, "some inputs were not processed");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
