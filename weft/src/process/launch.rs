//! Fire-and-forget process launching.
//!
//! The child inherits the caller's stdio and is never waited on unless the
//! caller asks for it through [`ProcessHandle::wait`].

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::LaunchError;

/// Program and arguments of a process to launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchOptions {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Build options from a single command line string.
    ///
    /// Tokens are separated by whitespace and double quotes group a token.
    /// A backslash escapes a following quote; any other backslash is kept as
    /// is, so paths like `\\server\share\tool.exe` pass through unchanged.
    pub fn from_command_line(command_line: &str) -> Result<Self, LaunchError> {
        let mut tokens = split_command_line(command_line).into_iter();
        let program = tokens.next().ok_or(LaunchError::Empty)?;
        Ok(Self::new(program).args(tokens))
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Handle to a launched process.
#[derive(Debug)]
pub struct ProcessHandle {
    program: String,
    child: Child,
}

impl ProcessHandle {
    /// OS process id, if the child has not been reaped yet.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Program that was launched.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Wait for the child to exit.
    pub async fn wait(mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }
}

/// Launch `command_line` and return without waiting for it.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```rust,no_run
/// use weft::process::launch;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let handle = launch("notepad.exe C:\\notes.txt")?;
///     println!("started pid {:?}", handle.pid());
///     Ok(())
/// }
/// ```
pub fn launch(command_line: &str) -> Result<ProcessHandle, LaunchError> {
    launch_with(LaunchOptions::from_command_line(command_line)?)
}

/// Launch a process described by `options`.
pub fn launch_with(options: LaunchOptions) -> Result<ProcessHandle, LaunchError> {
    if options.program.is_empty() {
        return Err(LaunchError::Empty);
    }

    let mut cmd = Command::new(&options.program);
    cmd.args(&options.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    match cmd.spawn() {
        Ok(child) => {
            debug!(program = %options.program, pid = ?child.id(), "process launched");
            Ok(ProcessHandle {
                program: options.program,
                child,
            })
        }
        Err(source) => {
            warn!(program = %options.program, error = %source, "launch failed");
            Err(LaunchError::LaunchFailure {
                program: options.program,
                source,
            })
        }
    }
}

fn split_command_line(command_line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = command_line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
                in_token = true;
            }
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}
