//! CLI command execution.

use std::future::Future;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use weft::config::{RunnerConfig, WorkerDescriptor};
use weft::process::{launch, launch_with, LaunchOptions};
use weft::runner::{JoinResult, WorkerRunner};

use super::args::{Cli, Commands};

/// Execute the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            workers,
            config,
            run_for,
            join_timeout,
        } => {
            let config = load_config(&workers, config.as_deref())?;
            let join_timeout = join_timeout.unwrap_or_else(|| config.join_timeout());
            run_workers(&config, run_for, join_timeout).await
        }
        Commands::Launch { command } => launch_command(&command),
    }
}

fn load_config(workers: &[WorkerDescriptor], path: Option<&Path>) -> Result<RunnerConfig> {
    if !workers.is_empty() {
        return Ok(RunnerConfig::from_descriptors(workers));
    }
    RunnerConfig::resolve(path).context("Failed to load worker configuration")
}

/// Start the configured workers and wait for them.
///
/// Without `run_for` this waits forever, like the classic demo; Ctrl-C
/// cancels the workers and joins them.
async fn run_workers(
    config: &RunnerConfig,
    run_for: Option<Duration>,
    join_timeout: Duration,
) -> Result<()> {
    let runner = WorkerRunner::stdout();
    let running = runner
        .start(config.workers.iter().copied())
        .context("Failed to start workers")?;

    let result = match run_for {
        Some(limit) => {
            tokio::select! {
                () = tokio::time::sleep(limit) => info!(?limit, "run time elapsed"),
                () = interrupted(tokio::signal::ctrl_c()) => info!("interrupted"),
            }
            runner.cancel(&running)?;
            runner.join(&running, Some(join_timeout)).await?
        }
        None => {
            tokio::select! {
                result = runner.join(&running, None) => result?,
                () = interrupted(tokio::signal::ctrl_c()) => {
                    info!("interrupted");
                    runner.cancel(&running)?;
                    runner.join(&running, Some(join_timeout)).await?
                }
            }
        }
    };

    match result {
        JoinResult::AllCompleted => {
            info!(workers = running.len(), "all workers stopped");
            Ok(())
        }
        JoinResult::TimedOut(ids) => bail!(
            "Workers {ids:?} did not stop within {}",
            humantime::format_duration(join_timeout)
        ),
    }
}

/// Resolve when `signal` fires. If the handler could not be installed this
/// logs the error and never resolves, leaving the run to its other exits.
async fn interrupted<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Launch a process and report its pid.
fn launch_command(command: &[String]) -> Result<()> {
    let handle = match command {
        [line] => launch(line),
        [program, args @ ..] => launch_with(LaunchOptions::new(program).args(args)),
        [] => bail!("Command is required for launch"),
    }
    .context("Failed to launch process")?;

    match handle.pid() {
        Some(pid) => println!("Launched {} (pid {pid})", handle.program()),
        None => println!("Launched {}", handle.program()),
    }
    Ok(())
}
