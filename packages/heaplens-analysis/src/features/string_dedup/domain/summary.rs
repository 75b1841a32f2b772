//! Deduplication summary model
//!
//! Immutable aggregates returned by a completed scan. A summary carries no
//! reference back to the snapshot; addresses are plain values that outlive
//! the snapshot's underlying resources.

use heaplens_snapshot::{Address, GENERATION_SLOTS, SEGMENT_KINDS};
use serde::Serialize;

/// One distinct string content with all of its occurrences
#[derive(Debug, Clone, Serialize)]
pub struct StringItem {
    pub content: String,
    pub occurrence_count: u64,
    /// Decoded character count of the content
    pub content_length: u64,
    /// Allocation size recorded from the first-seen occurrence
    pub instance_size: u64,
    pub wasted_bytes: u64,
    pub addresses: Vec<Address>,
    pub count_by_segment: [u64; SEGMENT_KINDS],
    pub count_by_generation: [u64; GENERATION_SLOTS],
}

/// Aggregate result of one deduplication scan
///
/// `items` is sorted non-increasing by `wasted_bytes`, ties broken by
/// content ascending, so repeated scans of an unmodified snapshot produce
/// identical output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StringSummary {
    pub items: Vec<StringItem>,
    /// Bytes of every object with a resolved type
    pub total_object_byte_count: u64,
    /// Bytes of every string occurrence, priced at its tally's recorded size
    pub total_string_byte_count: u64,
    /// Characters summed over all string occurrences
    pub total_char_count: u64,
    /// Characters summed over unique contents only
    pub unique_char_count: u64,
    pub total_string_count: u64,
    pub unique_string_count: u64,
    pub total_object_count: u64,
    pub total_wasted_bytes: u64,
    /// Average per-instance overhead beyond character payload, in bytes
    pub string_overhead_bytes: u32,
    /// Objects excluded because their type never resolved
    pub skipped_unresolved: u64,
}

impl StringSummary {
    /// Potential savings if every duplicate collapsed to one instance
    pub fn duplicate_count(&self) -> u64 {
        self.total_string_count - self.unique_string_count
    }
}
