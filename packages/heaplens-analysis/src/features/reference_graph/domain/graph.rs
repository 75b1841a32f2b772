//! Reference graph model
//!
//! The computed incoming-reference structure for a set of queried targets.
//! The underlying object graph may contain cycles; what is presented here is
//! a bounded, deduplicated set of referrer edges, each annotated with one
//! representative chain.

use super::field_reference::ReferrerChain;
use heaplens_snapshot::{Address, TypeId};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One deduplicated incoming edge: all instances of `referrer_type`
/// referencing the target through `field_offset` collapse into this record
#[derive(Debug, Clone, Serialize)]
pub struct ReferrerEdge {
    pub referrer_type: TypeId,
    pub referrer_type_name: String,
    pub field_offset: u64,
    /// Representative path from this referrer down to the queried target
    pub chain: ReferrerChain,
    /// Number of collapsed `(instance, slot)` references
    pub reference_count: u64,
    /// One of the referring instances, usable for drill-down queries
    pub representative_referrer: Address,
}

/// Whether any incoming edge was discovered for a target
///
/// `NoResolvableReferrer` is an explicit terminal answer (commonly the true
/// root is a stack or static root the pass does not resolve); it is never
/// conflated with "not yet processed". Unqueried addresses simply have no
/// node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferrerResolution {
    Resolved,
    NoResolvableReferrer,
}

/// Referrer edges discovered for one queried target
#[derive(Debug, Clone, Serialize)]
pub struct TargetNode {
    pub target: Address,
    pub edges: Vec<ReferrerEdge>,
    pub resolution: ReferrerResolution,
}

/// Scan statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub objects_scanned: u64,
    pub levels: usize,
    pub edges_total: usize,
    pub duration_ms: f64,
}

/// Incoming-reference structure for a set of queried targets
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceGraph {
    nodes: FxHashMap<Address, TargetNode>,
    pub stats: GraphStats,
}

impl ReferenceGraph {
    pub(crate) fn with_targets(targets: impl IntoIterator<Item = Address>) -> Self {
        let nodes = targets
            .into_iter()
            .map(|target| {
                (
                    target,
                    TargetNode {
                        target,
                        edges: Vec::new(),
                        resolution: ReferrerResolution::NoResolvableReferrer,
                    },
                )
            })
            .collect();
        Self {
            nodes,
            stats: GraphStats::default(),
        }
    }

    pub(crate) fn node_mut(&mut self, target: Address) -> Option<&mut TargetNode> {
        self.nodes.get_mut(&target)
    }

    pub(crate) fn seal(&mut self) {
        let mut edges_total = 0;
        for node in self.nodes.values_mut() {
            node.resolution = if node.edges.is_empty() {
                ReferrerResolution::NoResolvableReferrer
            } else {
                ReferrerResolution::Resolved
            };
            edges_total += node.edges.len();
        }
        self.stats.edges_total = edges_total;
    }

    /// Node for a queried target; `None` for addresses never queried
    pub fn node(&self, target: Address) -> Option<&TargetNode> {
        self.nodes.get(&target)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TargetNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
