//! cronwrap CLI - drives a sample job through a wrapper chain.
//!
//! The `run` command stands in for a scheduler: it fires the wrapped job on a
//! fixed tick, each invocation on its own task so runs can overlap, and then
//! reports what the chain did with them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use cronwrap_core::{Job, SharedJob, TracingLogger};
use cronwrap_wrappers::{ChainConfig, WrapperKind, DELAY_LOG_THRESHOLD};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cronwrap")]
#[command(version, about = "Overlap and fault policies for scheduled jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire a sample job through a wrapper chain
    Run(RunArgs),
    /// List the available wrappers
    Wrappers,
    /// Validate a JSON chain config
    Check {
        /// Path to the config file
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Wrappers to apply, outermost first
    #[arg(
        long,
        env = "CRONWRAP_WRAPPERS",
        value_delimiter = ',',
        default_value = "recover,skip-if-still-running"
    )]
    wrappers: Vec<WrapperKind>,

    /// JSON chain config; takes precedence over --wrappers
    #[arg(long, env = "CRONWRAP_CONFIG")]
    config: Option<PathBuf>,

    /// Milliseconds between invocations
    #[arg(long, env = "CRONWRAP_INTERVAL_MS", default_value_t = 1000,
          value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Number of invocations to issue
    #[arg(long, env = "CRONWRAP_TICKS", default_value_t = 5)]
    ticks: usize,

    /// How long each run of the sample job takes, in milliseconds
    #[arg(long, env = "CRONWRAP_WORK_MS", default_value_t = 2500)]
    work_ms: u64,

    /// Make every Nth run panic (0 = never)
    #[arg(long, env = "CRONWRAP_PANIC_EVERY", default_value_t = 0)]
    panic_every: usize,
}

/// Job that sleeps for a while and optionally panics.
struct SampleJob {
    runs: AtomicUsize,
    work: Duration,
    panic_every: usize,
}

#[async_trait]
impl Job for SampleJob {
    async fn run(&self) {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        info!(run, "Sample job started");
        tokio::time::sleep(self.work).await;

        if self.panic_every > 0 && run % self.panic_every == 0 {
            panic!("sample job failed on run {}", run);
        }
        info!(run, "Sample job finished");
    }

    fn name(&self) -> &str {
        "sample"
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Tracing (respects RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await?,
        Commands::Wrappers => {
            for kind in WrapperKind::ALL {
                println!("  {}", kind);
            }
            println!("Delay is logged once a run waits longer than {:?}", DELAY_LOG_THRESHOLD);
        }
        Commands::Check { path } => {
            let config = ChainConfig::load(&path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?;
            println!("{}: {} wrapper(s)", path.display(), config.wrappers.len());
            for kind in &config.wrappers {
                println!("  {}", kind);
            }
        }
    }

    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ChainConfig::load(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ChainConfig::new(args.wrappers.clone()),
    };
    if config.wrappers.is_empty() {
        warn!("No wrappers configured; runs may overlap and panics are not contained");
    }

    let sample = Arc::new(SampleJob {
        runs: AtomicUsize::new(0),
        work: Duration::from_millis(args.work_ms),
        panic_every: args.panic_every,
    });
    let chain = config.build(TracingLogger::shared());
    let job: SharedJob = chain.then(sample.clone());

    let wrappers: Vec<_> = config.wrappers.iter().map(|k| k.as_str()).collect();
    info!(wrappers = ?wrappers, ticks = args.ticks, interval_ms = args.interval_ms, "Starting");

    let mut tick = interval(Duration::from_millis(args.interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut handles = Vec::with_capacity(args.ticks);
    for n in 0..args.ticks {
        tokio::select! {
            _ = tick.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, no further invocations");
                break;
            }
        }
        debug!(tick = n + 1, "Invoking job");
        let job = job.clone();
        handles.push(tokio::spawn(async move { job.run().await }));
    }

    let issued = handles.len();
    let mut unrecovered = 0;
    for handle in handles {
        if let Err(e) = handle.await {
            if e.is_panic() {
                unrecovered += 1;
            } else {
                warn!("Invocation did not complete: {}", e);
            }
        }
    }

    let ran = sample.runs.load(Ordering::SeqCst);
    println!("Issued:      {}", issued);
    println!("Ran:         {}", ran);
    println!("Not run:     {}", issued.saturating_sub(ran));
    println!("Unrecovered: {}", unrecovered);

    Ok(())
}
