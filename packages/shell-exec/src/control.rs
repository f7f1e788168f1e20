use crate::error::ParseError;
use crate::host::HostError;

/// What the line reader should do after a line has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    /// End of session, requested by the `exit` command.
    Exit,
}

/// Returned by a handler to end the session. The executor turns it into
/// `ControlFlow::Exit` instead of reporting it.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("exit requested")]
pub struct ExitRequested;

/// Why a line stopped before all of its stages ran.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("command \"{0}\" cannot be executed on its own, see {0} --help")]
    NotExecutable(String),
    #[error("{command}: {error:#}")]
    Execution {
        command: String,
        error: anyhow::Error,
    },
    #[error("failed to capture output: {0}")]
    Capture(#[from] std::io::Error),
    #[error(transparent)]
    Host(#[from] HostError),
}
