//! String deduplication analyzer
//!
//! Single full pass over every segment of a heap snapshot, aggregating
//! string objects by decoded content into an [`ObjectTally`] table and
//! folding the table into an immutable [`StringSummary`].
//!
//! # Complexity
//! - Time: O(total object count)
//! - Space: O(unique string count)
//!
//! Cancellation is polled once per object. A failed or cancelled scan
//! returns no summary at all, never a partial one.

use crate::error::{AnalysisError, Result};
use crate::features::string_dedup::domain::{ObjectTally, StringItem, StringSummary};
use crate::shared::CancellationToken;
use heaplens_snapshot::{Address, HeapSnapshot, SegmentKind, TypeId};
use rayon::slice::ParallelSliceMut;
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::{debug, info};

/// Analyzer configuration
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Record every occurrence's address on its tally; disable for very
    /// large heaps where only the aggregate counters matter
    pub track_addresses: bool,

    /// Log occurrences whose measured size differs from the tally's
    /// recorded first-seen size
    pub log_size_mismatches: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            track_addresses: true,
            log_size_mismatches: true,
        }
    }
}

/// Single-pass duplicate-string analyzer
#[derive(Debug, Clone, Default)]
pub struct StringDedupAnalyzer {
    config: DedupConfig,
}

impl StringDedupAnalyzer {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Aggregate duplicate-string statistics for the whole heap
    pub fn analyze(
        &self,
        snapshot: &dyn HeapSnapshot,
        token: &CancellationToken,
    ) -> Result<StringSummary> {
        self.analyze_inner(snapshot, None, token)
    }

    /// Re-run the scan restricted to objects referenced by `field_offset`
    /// of `referrer_type` instances, for iterative drill-down
    pub fn analyze_filtered(
        &self,
        snapshot: &dyn HeapSnapshot,
        referrer_type: TypeId,
        field_offset: u64,
        token: &CancellationToken,
    ) -> Result<StringSummary> {
        let targets = collect_field_targets(snapshot, referrer_type, field_offset, token)?;
        debug!(
            "Field filter {}+{:#x} matched {} referenced addresses",
            referrer_type,
            field_offset,
            targets.len()
        );
        self.analyze_inner(snapshot, Some(&targets), token)
    }

    fn analyze_inner(
        &self,
        snapshot: &dyn HeapSnapshot,
        filter: Option<&FxHashSet<Address>>,
        token: &CancellationToken,
    ) -> Result<StringSummary> {
        token.checkpoint()?;
        let started = Instant::now();

        let mut tally_by_content: FxHashMap<String, ObjectTally> = FxHashMap::default();
        let mut total_object_count = 0u64;
        let mut total_object_bytes = 0u64;
        let mut total_string_count = 0u64;
        let mut total_string_bytes = 0u64;
        let mut running_char_count = 0u64;
        let mut skipped_unresolved = 0u64;

        for (seg_index, seg_info) in snapshot.segments().iter().enumerate() {
            let kind = SegmentKind::classify(*seg_info);

            for item in snapshot.objects(seg_index) {
                let record = item.map_err(AnalysisError::walk_failed)?;
                token.checkpoint()?;

                let Some(type_id) = record.type_id else {
                    skipped_unresolved += 1;
                    continue;
                };
                let Some(type_record) = snapshot.type_record(type_id) else {
                    skipped_unresolved += 1;
                    continue;
                };

                if let Some(filter) = filter {
                    if !filter.contains(&record.address) {
                        continue;
                    }
                }

                let size = snapshot.object_size(type_id, record.address);
                total_object_count += 1;
                total_object_bytes += size;

                if !type_record.is_string {
                    continue;
                }

                let value = snapshot.string_value(type_id, record.address)?;
                running_char_count += value.chars().count() as u64;
                total_string_count += 1;

                let tally = tally_by_content
                    .entry(value)
                    .or_insert_with(|| ObjectTally::new(size));
                if self.config.log_size_mismatches && tally.instance_size() != size {
                    debug!(
                        "String at {:#x} measures {} bytes, tally recorded {}",
                        record.address,
                        size,
                        tally.instance_size()
                    );
                }
                // The tally's recorded size is charged for every occurrence:
                // content-equal instances are assumed to share one allocation
                // size, so totals stay consistent with wasted_bytes.
                total_string_bytes += tally.instance_size();
                tally.add(
                    record.address,
                    kind,
                    record.generation,
                    self.config.track_addresses,
                );
            }
        }

        let unique_string_count = tally_by_content.len() as u64;
        let mut total_char_count = 0u64;
        let mut unique_char_count = 0u64;
        let mut total_wasted_bytes = 0u64;

        let mut items: Vec<StringItem> = tally_by_content
            .into_iter()
            .map(|(content, tally)| {
                let content_length = content.chars().count() as u64;
                let wasted_bytes = tally.wasted_bytes();
                total_char_count += content_length * tally.count();
                unique_char_count += content_length;
                total_wasted_bytes += wasted_bytes;

                let (instance_size, occurrence_count, addresses, count_by_segment, count_by_generation) =
                    tally.into_parts();
                StringItem {
                    content,
                    occurrence_count,
                    content_length,
                    instance_size,
                    wasted_bytes,
                    addresses,
                    count_by_segment,
                    count_by_generation,
                }
            })
            .collect();

        // Deterministic order: wasted bytes descending, content ascending
        items.par_sort_unstable_by(|a, b| {
            b.wasted_bytes
                .cmp(&a.wasted_bytes)
                .then_with(|| a.content.cmp(&b.content))
        });

        let width = snapshot.char_width_bytes() as f64;
        let string_overhead_bytes = if total_string_count == 0 {
            0
        } else {
            let overhead = (total_string_bytes as f64 - width * running_char_count as f64)
                / total_string_count as f64;
            overhead.round().max(0.0) as u32
        };

        info!(
            "Dedup scan finished in {:.1}ms: {} objects, {} strings ({} unique), {} bytes wasted",
            started.elapsed().as_secs_f64() * 1e3,
            total_object_count,
            total_string_count,
            unique_string_count,
            total_wasted_bytes
        );

        Ok(StringSummary {
            items,
            total_object_byte_count: total_object_bytes,
            total_string_byte_count: total_string_bytes,
            total_char_count,
            unique_char_count,
            total_string_count,
            unique_string_count,
            total_object_count,
            total_wasted_bytes,
            string_overhead_bytes,
            skipped_unresolved,
        })
    }
}

/// Collect every address held in `field_offset` of `referrer_type`
/// instances; the filtered re-analysis scopes its scan to this set
fn collect_field_targets(
    snapshot: &dyn HeapSnapshot,
    referrer_type: TypeId,
    field_offset: u64,
    token: &CancellationToken,
) -> Result<FxHashSet<Address>> {
    token.checkpoint()?;
    let mut targets = FxHashSet::default();

    for seg_index in 0..snapshot.segments().len() {
        for item in snapshot.objects(seg_index) {
            let record = item.map_err(AnalysisError::walk_failed)?;
            token.checkpoint()?;

            if record.type_id != Some(referrer_type) {
                continue;
            }
            for slot in snapshot.fields(record.address) {
                if slot.offset == field_offset {
                    if let Some(address) = slot.value {
                        targets.insert(address);
                    }
                }
            }
        }
    }

    Ok(targets)
}
