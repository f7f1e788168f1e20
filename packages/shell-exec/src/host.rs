use std::io::{self, Write};

#[derive(Debug, Clone)]
pub enum HostError {
    NotFound(String),
    PermissionDenied(String),
    IoError(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::PermissionDenied(msg) => write!(f, "permission denied: {msg}"),
            Self::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

impl HostError {
    fn from_io(path: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_string()),
            _ => Self::IoError(format!("{path}: {err}")),
        }
    }
}

/// Clears the terminal and homes the cursor.
pub const CLEAR_SEQUENCE: &str = "\x1b[2J\x1b[1;1H";

// ---------------------------------------------------------------------------
// HostInterface trait — implemented by OsHost or test stubs
// ---------------------------------------------------------------------------

/// Side effects the executor and built-in commands need from the outside
/// world.
pub trait HostInterface {
    /// Create or truncate `path` and write `data` to it.
    fn write_file(&self, path: &str, data: &[u8]) -> Result<(), HostError>;

    fn clear_screen(&self, out: &mut dyn Write) -> Result<(), HostError>;
}

/// The real filesystem and terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsHost;

impl HostInterface for OsHost {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<(), HostError> {
        std::fs::write(path, data).map_err(|e| HostError::from_io(path, e))
    }

    fn clear_screen(&self, out: &mut dyn Write) -> Result<(), HostError> {
        out.write_all(CLEAR_SEQUENCE.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| HostError::IoError(e.to_string()))
    }
}
