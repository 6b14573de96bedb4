//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout carries nothing but worker output.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter directive for the given CLI verbosity.
pub fn directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "weft=error";
    }
    match verbose {
        0 => "weft=warn",
        1 => "weft=info",
        2 => "weft=debug",
        _ => "weft=trace",
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the flags.
///
/// Fails if a global subscriber is already installed.
pub fn init(verbose: u8, quiet: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
        .try_init()
}
