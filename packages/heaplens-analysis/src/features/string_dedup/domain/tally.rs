//! Object tally
//!
//! Working aggregate for one distinct string content across all of its
//! occurrences. Content equality merges distinct objects into one tally;
//! the instance size recorded from the first-seen occurrence prices every
//! later duplicate.

use heaplens_snapshot::{Address, SegmentKind, GENERATION_SLOTS, SEGMENT_KINDS};

/// Counter slot for a generation index; slot 0 is "no generation",
/// generations 0..2 land at `index + 1`
#[inline]
fn generation_slot(generation: i8) -> usize {
    (generation as i16 + 1).clamp(0, GENERATION_SLOTS as i16 - 1) as usize
}

/// Aggregate record for one unique string content
#[derive(Debug, Clone)]
pub struct ObjectTally {
    instance_size: u64,
    count: u64,
    addresses: Vec<Address>,
    count_by_segment: [u64; SEGMENT_KINDS],
    count_by_generation: [u64; GENERATION_SLOTS],
}

impl ObjectTally {
    /// Start a tally; `instance_size` comes from the first-seen occurrence
    pub fn new(instance_size: u64) -> Self {
        Self {
            instance_size,
            count: 0,
            addresses: Vec::with_capacity(2),
            count_by_segment: [0; SEGMENT_KINDS],
            count_by_generation: [0; GENERATION_SLOTS],
        }
    }

    /// Record one occurrence
    pub fn add(&mut self, address: Address, kind: SegmentKind, generation: i8, track_address: bool) {
        self.count += 1;
        if track_address {
            self.addresses.push(address);
        }
        self.count_by_segment[kind.index()] += 1;
        self.count_by_generation[generation_slot(generation)] += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn instance_size(&self) -> u64 {
        self.instance_size
    }

    /// Bytes occupied by redundant (non-first) occurrences
    pub fn wasted_bytes(&self) -> u64 {
        self.count.saturating_sub(1) * self.instance_size
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn count_by_segment(&self) -> [u64; SEGMENT_KINDS] {
        self.count_by_segment
    }

    pub fn count_by_generation(&self) -> [u64; GENERATION_SLOTS] {
        self.count_by_generation
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        u64,
        u64,
        Vec<Address>,
        [u64; SEGMENT_KINDS],
        [u64; GENERATION_SLOTS],
    ) {
        (
            self.instance_size,
            self.count,
            self.addresses,
            self.count_by_segment,
            self.count_by_generation,
        )
    }
}
