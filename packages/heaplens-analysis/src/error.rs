//! Typed analysis errors
//!
//! Scan-level failures propagate to the caller with full diagnostic context;
//! there is no silent downgrade to a partial or empty result. Cancellation
//! travels through the same `Result` channel so a cancelled scan cannot leak
//! a half-filled summary, but [`AnalysisError::is_cancelled`] lets callers
//! treat it as the non-failure it is.

use heaplens_snapshot::SnapshotError;
use thiserror::Error;

/// Analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Caller-requested abort; no result was produced
    #[error("Scan cancelled")]
    Cancelled,

    /// Heap layout inconsistent during a pass; the scan aborted
    #[error("Heap is not walkable: {detail}")]
    HeapUnwalkable {
        detail: String,
        #[source]
        source: Option<SnapshotError>,
    },

    /// Snapshot-level failure (dump load, address resolution)
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl AnalysisError {
    /// Create a heap-unwalkable error without an underlying snapshot error
    pub fn heap_unwalkable(detail: impl Into<String>) -> Self {
        Self::HeapUnwalkable {
            detail: detail.into(),
            source: None,
        }
    }

    /// Wrap a mid-walk snapshot error
    pub fn walk_failed(source: SnapshotError) -> Self {
        Self::HeapUnwalkable {
            detail: source.message.clone(),
            source: Some(source),
        }
    }

    /// True for cooperative aborts, false for real failures
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::HeapUnwalkable { .. } => "heap_unwalkable",
            Self::Snapshot(_) => "snapshot",
        }
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
