//! heaplens-analysis - Duplicate-string and referrer analysis for heap dumps
//!
//! Two full-heap algorithms over a frozen [`HeapSnapshot`]:
//!
//! - [`StringDedupAnalyzer`] - single-pass aggregation of every string
//!   object by decoded content, reporting duplicate occurrence counts and
//!   wasted bytes ([`StringSummary`])
//! - [`ReferenceGraphBuilder`] - reverse-reachability: inverts the
//!   forward-only object graph to explain what refers to a chosen set of
//!   addresses ([`ReferenceGraph`]), cycle-safe and depth-bounded
//!
//! Both scans are synchronous, poll a [`CancellationToken`] once per object,
//! and never publish partial results: a cancelled or failed scan returns an
//! error, not a half-filled aggregate. [`AnalysisSession`] ties one snapshot
//! to the analyzers and serializes concurrent scan requests.
//!
//! ```rust
//! use heaplens_analysis::{AnalysisSession, CancellationToken};
//! use heaplens_snapshot::{SnapshotBuilder, TypeRecord};
//!
//! let mut b = SnapshotBuilder::new();
//! let string_ty = b.add_type(TypeRecord::string("System.String"));
//! let seg = b.ephemeral_segment();
//! b.push_string(seg, 0x1000, string_ty, 24, 0, "config");
//! b.push_string(seg, 0x2000, string_ty, 24, 0, "config");
//!
//! let session = AnalysisSession::new(Box::new(b.build()));
//! let summary = session.request_string_summary(&CancellationToken::new()).unwrap();
//! assert_eq!(summary.total_wasted_bytes, 24);
//! ```

pub mod error;
pub mod features;
pub mod session;
pub mod shared;

pub use error::{AnalysisError, Result};
pub use features::reference_graph::{
    describe_field_references, FieldReference, GraphConfig, ReferenceGraph,
    ReferenceGraphBuilder, ReferrerChain, ReferrerEdge, ReferrerResolution, TargetNode,
};
pub use features::string_dedup::{
    DedupConfig, ObjectTally, StringDedupAnalyzer, StringItem, StringSummary,
};
pub use session::AnalysisSession;
pub use shared::CancellationToken;

// Snapshot abstraction re-export for downstream convenience
pub use heaplens_snapshot::HeapSnapshot;
