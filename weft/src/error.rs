//! Error types returned by the runner and the process launcher.

use uuid::Uuid;

/// Errors from starting, cancelling or joining workers.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The worker configuration was empty, had duplicate ids, or a zero pace.
    #[error("invalid worker spec: {0}")]
    InvalidSpec(String),

    /// The running set was not created by this runner, or was already joined.
    #[error("unknown running set {0}")]
    UnknownHandle(Uuid),
}

/// Errors from launching an external process.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The command line contained no program.
    #[error("command line is empty")]
    Empty,

    /// The OS refused to create the process.
    #[error("failed to launch '{program}': {source}")]
    LaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
