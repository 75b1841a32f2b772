//! Reference graph builder
//!
//! The snapshot exposes only forward references, so "what points at X" is
//! answered by inversion: a full forward pass over every live object's
//! fields, batched against the union of all queried targets. Chain
//! extension beyond the first hop repeats the pass level by level, with a
//! per-target visited set so cyclic object graphs terminate.
//!
//! Edges are deduplicated by `(referrer type, field offset, target)`:
//! repeated incoming references from many instances of one type/field
//! collapse into a single edge carrying one representative chain and a
//! reference counter.

use crate::error::{AnalysisError, Result};
use crate::features::reference_graph::domain::{
    FieldReference, ReferenceGraph, ReferrerChain, ReferrerEdge,
};
use crate::shared::CancellationToken;
use heaplens_snapshot::{Address, HeapSnapshot, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::{debug, info};

/// Builder configuration
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Maximum referrer-chain length; each extra level costs one full
    /// forward pass over the heap
    pub max_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

/// A frontier address together with the root target it explains and the
/// chain discovered so far (`None` at level zero: the address IS the root)
#[derive(Debug, Clone)]
struct PendingRef {
    root: Address,
    chain: Option<ReferrerChain>,
}

/// Forward-pass inverter producing a [`ReferenceGraph`]
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraphBuilder {
    config: GraphConfig,
}

impl ReferenceGraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Compute incoming-reference structure for `targets`
    ///
    /// Batching: one call with the union of several target sets amortizes
    /// the O(live object count) pass across all of them.
    pub fn build(
        &self,
        snapshot: &dyn HeapSnapshot,
        targets: &FxHashSet<Address>,
        token: &CancellationToken,
    ) -> Result<ReferenceGraph> {
        token.checkpoint()?;
        let started = Instant::now();

        let mut graph = ReferenceGraph::with_targets(targets.iter().copied());

        // Per-root visited identities; roots never re-enter their own walk
        let mut visited: FxHashMap<Address, FxHashSet<Address>> = targets
            .iter()
            .map(|&t| (t, [t].into_iter().collect()))
            .collect();

        let mut frontier: FxHashMap<Address, Vec<PendingRef>> = FxHashMap::default();
        for &target in targets {
            frontier
                .entry(target)
                .or_default()
                .push(PendingRef {
                    root: target,
                    chain: None,
                });
        }

        // (referrer type, field offset, root) -> edge slot in the root's node
        let mut edge_slots: FxHashMap<(TypeId, u64, Address), usize> = FxHashMap::default();
        let mut objects_scanned = 0u64;
        let mut levels = 0usize;

        while levels < self.config.max_depth && !frontier.is_empty() {
            levels += 1;
            let mut next: FxHashMap<Address, Vec<PendingRef>> = FxHashMap::default();

            for seg_index in 0..snapshot.segments().len() {
                for item in snapshot.objects(seg_index) {
                    let record = item.map_err(AnalysisError::walk_failed)?;
                    token.checkpoint()?;
                    objects_scanned += 1;

                    let Some(type_id) = record.type_id else {
                        continue;
                    };

                    for slot in snapshot.fields(record.address) {
                        let Some(value) = slot.value else {
                            continue;
                        };
                        let Some(pendings) = frontier.get(&value) else {
                            continue;
                        };

                        for pending in pendings {
                            let key = (type_id, slot.offset, pending.root);
                            if let Some(&edge_idx) = edge_slots.get(&key) {
                                if let Some(node) = graph.node_mut(pending.root) {
                                    node.edges[edge_idx].reference_count += 1;
                                }
                                continue;
                            }

                            let (type_name, field_name) = match snapshot.type_record(type_id) {
                                Some(ty) => (
                                    ty.name.clone(),
                                    ty.field_name(slot.offset).map(str::to_string),
                                ),
                                None => (type_id.to_string(), None),
                            };
                            let step = FieldReference {
                                referrer_type: type_name.clone(),
                                field_offset: slot.offset,
                                field_name,
                            };
                            let chain = match &pending.chain {
                                None => ReferrerChain::single(step),
                                Some(existing) => existing.extended(step),
                            };

                            let Some(node) = graph.node_mut(pending.root) else {
                                continue;
                            };
                            edge_slots.insert(key, node.edges.len());
                            node.edges.push(ReferrerEdge {
                                referrer_type: type_id,
                                referrer_type_name: type_name,
                                field_offset: slot.offset,
                                chain: chain.clone(),
                                reference_count: 1,
                                representative_referrer: record.address,
                            });

                            // One representative per edge walks further up;
                            // an identity already on this root's walk ends
                            // the branch, which is what makes cycles safe
                            if let Some(seen) = visited.get_mut(&pending.root) {
                                if seen.insert(record.address) {
                                    next.entry(record.address).or_default().push(PendingRef {
                                        root: pending.root,
                                        chain: Some(chain),
                                    });
                                }
                            }
                        }
                    }
                }
            }

            debug!(
                "Referrer level {} produced {} frontier addresses",
                levels,
                next.len()
            );
            frontier = next;
        }

        graph.seal();
        graph.stats.objects_scanned = objects_scanned;
        graph.stats.levels = levels;
        graph.stats.duration_ms = started.elapsed().as_secs_f64() * 1e3;

        info!(
            "Reference graph for {} targets: {} edges over {} levels ({} objects scanned, {:.1}ms)",
            targets.len(),
            graph.stats.edges_total,
            graph.stats.levels,
            graph.stats.objects_scanned,
            graph.stats.duration_ms
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reference_graph::domain::ReferrerResolution;
    use heaplens_snapshot::{FieldSlot, SnapshotBuilder, TypeRecord};
    use pretty_assertions::assert_eq;

    fn build(
        snapshot: &impl HeapSnapshot,
        targets: &[Address],
    ) -> ReferenceGraph {
        ReferenceGraphBuilder::default()
            .build(
                snapshot,
                &targets.iter().copied().collect(),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_direct_referrer_single_edge() {
        let mut b = SnapshotBuilder::new();
        let string_ty = b.add_type(TypeRecord::string("System.String"));
        let mut holder = TypeRecord::new("MyApp.Session");
        holder.fields.push(heaplens_snapshot::FieldDef {
            offset: 0x8,
            name: Some("_name".to_string()),
        });
        let holder_ty = b.add_type(holder);

        let seg = b.regular_segment();
        b.push_string(seg, 0x1000, string_ty, 24, 0, "foo");
        b.push_object_with_fields(
            seg,
            0x2000,
            holder_ty,
            32,
            1,
            vec![FieldSlot {
                offset: 0x8,
                value: Some(0x1000),
            }],
        );
        let snapshot = b.build();

        let graph = build(&snapshot, &[0x1000]);
        let node = graph.node(0x1000).unwrap();
        assert_eq!(node.resolution, ReferrerResolution::Resolved);
        assert_eq!(node.edges.len(), 1);

        let edge = &node.edges[0];
        assert_eq!(edge.field_offset, 0x8);
        assert_eq!(edge.reference_count, 1);
        assert_eq!(edge.chain.describe(), "MyApp.Session._name");
    }

    #[test]
    fn test_array_with_two_slots_collapses_to_one_edge() {
        let mut b = SnapshotBuilder::new();
        let string_ty = b.add_type(TypeRecord::string("System.String"));
        let array_ty = b.add_type(TypeRecord::new("System.String[]"));

        let seg = b.regular_segment();
        b.push_string(seg, 0x1000, string_ty, 24, 0, "foo");
        b.push_object_with_fields(
            seg,
            0x2000,
            array_ty,
            64,
            1,
            vec![
                FieldSlot {
                    offset: 0x10,
                    value: Some(0x1000),
                },
                FieldSlot {
                    offset: 0x10,
                    value: Some(0x1000),
                },
            ],
        );
        let snapshot = b.build();

        let graph = build(&snapshot, &[0x1000]);
        let node = graph.node(0x1000).unwrap();
        assert_eq!(node.edges.len(), 1);
        assert_eq!(node.edges[0].reference_count, 2);
        assert_eq!(node.edges[0].chain.len(), 1);
    }

    #[test]
    fn test_cyclic_graph_terminates() {
        // A.field -> B, B.field -> A, B.field2 -> target
        let mut b = SnapshotBuilder::new();
        let string_ty = b.add_type(TypeRecord::string("System.String"));
        let a_ty = b.add_type(TypeRecord::new("TypeA"));
        let b_ty = b.add_type(TypeRecord::new("TypeB"));

        let seg = b.regular_segment();
        b.push_string(seg, 0x1000, string_ty, 24, 0, "target");
        b.push_object_with_fields(
            seg,
            0xa000,
            a_ty,
            32,
            1,
            vec![FieldSlot {
                offset: 0x8,
                value: Some(0xb000),
            }],
        );
        b.push_object_with_fields(
            seg,
            0xb000,
            b_ty,
            32,
            1,
            vec![
                FieldSlot {
                    offset: 0x8,
                    value: Some(0xa000),
                },
                FieldSlot {
                    offset: 0x10,
                    value: Some(0x1000),
                },
            ],
        );
        let snapshot = b.build();

        let graph = build(&snapshot, &[0x1000]);
        let node = graph.node(0x1000).unwrap();

        let direct = node
            .edges
            .iter()
            .find(|e| e.referrer_type_name == "TypeB" && e.field_offset == 0x10)
            .expect("B.field2 edge must exist");
        assert_eq!(direct.chain.len(), 1);

        // every chain is finite and no edge is recorded twice
        let mut keys: Vec<_> = node
            .edges
            .iter()
            .map(|e| (e.referrer_type, e.field_offset))
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), node.edges.len());
    }

    #[test]
    fn test_unreferenced_target_is_explicit_leaf() {
        let mut b = SnapshotBuilder::new();
        let string_ty = b.add_type(TypeRecord::string("System.String"));
        let seg = b.regular_segment();
        b.push_string(seg, 0x1000, string_ty, 24, 0, "orphan");
        let snapshot = b.build();

        let graph = build(&snapshot, &[0x1000]);
        let node = graph.node(0x1000).unwrap();
        assert_eq!(node.resolution, ReferrerResolution::NoResolvableReferrer);
        assert!(node.edges.is_empty());
    }

    #[test]
    fn test_pre_cancelled_build_reports_cancelled() {
        let snapshot = SnapshotBuilder::new().build();
        let token = CancellationToken::new();
        token.cancel();

        let err = ReferenceGraphBuilder::default()
            .build(&snapshot, &[0x1000].into_iter().collect(), &token)
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_depth_limit_bounds_chains() {
        // linear chain: o4 -> o3 -> o2 -> o1 -> target
        let mut b = SnapshotBuilder::new();
        let string_ty = b.add_type(TypeRecord::string("System.String"));
        let link_ty = b.add_type(TypeRecord::new("Link"));

        let seg = b.regular_segment();
        b.push_string(seg, 0x1000, string_ty, 24, 0, "t");
        let mut referent = 0x1000u64;
        for addr in [0x2000u64, 0x3000, 0x4000, 0x5000] {
            b.push_object_with_fields(
                seg,
                addr,
                link_ty,
                32,
                1,
                vec![FieldSlot {
                    offset: 0x8,
                    value: Some(referent),
                }],
            );
            referent = addr;
        }
        let snapshot = b.build();

        let graph = ReferenceGraphBuilder::new(GraphConfig { max_depth: 2 })
            .build(
                &snapshot,
                &[0x1000].into_iter().collect(),
                &CancellationToken::new(),
            )
            .unwrap();

        let node = graph.node(0x1000).unwrap();
        assert!(node.edges.iter().all(|e| e.chain.len() <= 2));
        assert_eq!(graph.stats.levels, 2);
    }
}
