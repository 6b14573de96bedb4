//! CLI argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

use weft::config::WorkerDescriptor;

/// Weft - run repeating workers in parallel, or launch a process
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log detail on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start workers and print their patterns to stdout
    Run {
        /// Worker as <pattern>@<pace>, e.g. counter@10ms (repeatable)
        #[arg(short, long = "worker", value_name = "PATTERN@PACE")]
        workers: Vec<WorkerDescriptor>,

        /// JSON file listing the workers to start
        #[arg(short, long, conflicts_with = "workers")]
        config: Option<PathBuf>,

        /// Stop the workers after this long (runs until Ctrl-C if omitted)
        #[arg(long = "for", value_name = "DURATION", value_parser = humantime::parse_duration)]
        run_for: Option<Duration>,

        /// How long to wait for workers to stop once cancelled
        #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
        join_timeout: Option<Duration>,
    },

    /// Launch a program without waiting for it
    Launch {
        /// Command line to run; a single argument is split like a shell would
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
}
