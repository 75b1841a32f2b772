//! Cooperative cancellation
//!
//! A [`CancellationToken`] is a cloneable handle over one shared flag. Scans
//! poll it once per object, so the latency between a cancel request and scan
//! termination is bounded by one object's processing cost. Cancellation is
//! observed only at checkpoints; nothing is interrupted preemptively.

use crate::error::{AnalysisError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation handle; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fine-grained poll point; returns `Err(Cancelled)` once requested
    #[inline]
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}
