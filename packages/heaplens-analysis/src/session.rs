//! Analysis session
//!
//! Owns one opened snapshot for the duration of an analysis session and
//! exposes the request surface the presentation layer consumes. The
//! snapshot's read mechanism is not assumed safe for concurrent readers, so
//! the session serializes scans behind a lock: concurrent requests queue and
//! run one at a time. Returned summaries and graphs are immutable and may be
//! read from any number of threads.
//!
//! The session itself is execution-context-agnostic; callers that must keep
//! an interactive thread free invoke these requests from a worker context.

use crate::error::Result;
use crate::features::reference_graph::{GraphConfig, ReferenceGraph, ReferenceGraphBuilder};
use crate::features::string_dedup::{DedupConfig, StringDedupAnalyzer, StringSummary};
use crate::shared::CancellationToken;
use heaplens_snapshot::{infrastructure::json, Address, HeapSnapshot, TypeId};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::path::Path;

/// One opened snapshot plus the analyzers that scan it
pub struct AnalysisSession {
    snapshot: Box<dyn HeapSnapshot>,
    dedup: StringDedupAnalyzer,
    graphs: ReferenceGraphBuilder,
    scan_lock: Mutex<()>,
}

impl AnalysisSession {
    /// Open a JSON heap dump and start a session over it
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let snapshot = json::open(path)?;
        Ok(Self::new(Box::new(snapshot)))
    }

    /// Start a session over an already-opened snapshot
    pub fn new(snapshot: Box<dyn HeapSnapshot>) -> Self {
        Self::with_configs(snapshot, DedupConfig::default(), GraphConfig::default())
    }

    pub fn with_configs(
        snapshot: Box<dyn HeapSnapshot>,
        dedup: DedupConfig,
        graph: GraphConfig,
    ) -> Self {
        Self {
            snapshot,
            dedup: StringDedupAnalyzer::new(dedup),
            graphs: ReferenceGraphBuilder::new(graph),
            scan_lock: Mutex::new(()),
        }
    }

    /// Duplicate-string statistics for the whole heap
    pub fn request_string_summary(&self, token: &CancellationToken) -> Result<StringSummary> {
        let _scan = self.scan_lock.lock();
        self.dedup.analyze(self.snapshot.as_ref(), token)
    }

    /// Incoming-reference structure for a set of target addresses
    pub fn request_reference_graph(
        &self,
        targets: &FxHashSet<Address>,
        token: &CancellationToken,
    ) -> Result<ReferenceGraph> {
        let _scan = self.scan_lock.lock();
        self.graphs.build(self.snapshot.as_ref(), targets, token)
    }

    /// Duplicate-string statistics restricted to strings referenced by
    /// `field_offset` of `referrer_type` instances
    pub fn request_field_filtered_summary(
        &self,
        referrer_type: TypeId,
        field_offset: u64,
        token: &CancellationToken,
    ) -> Result<StringSummary> {
        let _scan = self.scan_lock.lock();
        self.dedup
            .analyze_filtered(self.snapshot.as_ref(), referrer_type, field_offset, token)
    }

    /// Resolve a type by exact name; linear in the snapshot's type table
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        (0..self.snapshot.type_count())
            .map(TypeId)
            .find(|&id| {
                self.snapshot
                    .type_record(id)
                    .is_some_and(|ty| ty.name == name)
            })
    }

    pub fn snapshot(&self) -> &dyn HeapSnapshot {
        self.snapshot.as_ref()
    }
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("type_count", &self.snapshot.type_count())
            .finish_non_exhaustive()
    }
}
