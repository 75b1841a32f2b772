//! Heap segments
//!
//! A segment is a contiguous region of the managed heap. Its kind is
//! classified once, before its objects are enumerated, from the two flags
//! the runtime exposes; ephemeral wins over large when both are set.

use serde::{Deserialize, Serialize};

/// Ordered per-segment metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub is_ephemeral: bool,
    pub is_large: bool,
}

/// Mutually exclusive segment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Youngest generations
    Ephemeral,
    /// Oversized allocations
    LargeObject,
    Regular,
}

/// Number of segment kinds, for per-kind counter arrays
pub const SEGMENT_KINDS: usize = 3;

impl SegmentKind {
    /// Classify a segment; ephemeral is checked first
    pub fn classify(info: SegmentInfo) -> Self {
        if info.is_ephemeral {
            SegmentKind::Ephemeral
        } else if info.is_large {
            SegmentKind::LargeObject
        } else {
            SegmentKind::Regular
        }
    }

    /// Counter-array slot for this kind
    #[inline]
    pub fn index(self) -> usize {
        match self {
            SegmentKind::Ephemeral => 0,
            SegmentKind::LargeObject => 1,
            SegmentKind::Regular => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Ephemeral => "ephemeral",
            SegmentKind::LargeObject => "large_object",
            SegmentKind::Regular => "regular",
        }
    }
}
