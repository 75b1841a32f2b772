//! Error types for heaplens-snapshot

use std::fmt;
use thiserror::Error;

/// Snapshot error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Dump file could not be opened or parsed
    DumpLoad,
    /// Heap layout is inconsistent and cannot be walked further
    Unwalkable,
    /// Address does not resolve to an object in this snapshot
    BadAddress,
    /// Object is not a string instance
    NotAString,
    /// I/O errors
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DumpLoad => "dump_load",
            ErrorKind::Unwalkable => "unwalkable",
            ErrorKind::BadAddress => "bad_address",
            ErrorKind::NotAString => "not_a_string",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct SnapshotError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl SnapshotError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn dump_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DumpLoad, message)
    }

    pub fn unwalkable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unwalkable, message)
    }

    pub fn bad_address(address: u64) -> Self {
        Self::new(
            ErrorKind::BadAddress,
            format!("No object at address {address:#x}"),
        )
    }

    pub fn not_a_string(address: u64) -> Self {
        Self::new(
            ErrorKind::NotAString,
            format!("Object at {address:#x} is not a string"),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::io(format!("I/O error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::dump_load(format!("Malformed dump: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = SnapshotError::bad_address(0x1000);
        let msg = format!("{}", err);
        assert!(msg.contains("bad_address"));
        assert!(msg.contains("0x1000"));
    }

    #[test]
    fn test_unwalkable_error() {
        let err = SnapshotError::unwalkable("segment 2 truncated");
        assert_eq!(err.kind, ErrorKind::Unwalkable);
        assert_eq!(format!("{}", err), "[unwalkable] segment 2 truncated");
    }

    #[test]
    fn test_with_source() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = SnapshotError::dump_load("dump missing").with_source(io_err);

        assert_eq!(err.kind, ErrorKind::DumpLoad);
        let source = err.source().unwrap();
        assert!(source.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_io_error() {
        use std::io;

        let err: SnapshotError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.source.is_some());
    }
}
