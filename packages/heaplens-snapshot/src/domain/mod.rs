//! Snapshot domain model

mod object;
mod segment;
mod snapshot;

pub use object::{
    Address, FieldDef, FieldSlot, ObjectRecord, TypeId, TypeRecord, GENERATION_SLOTS,
    NO_GENERATION,
};
pub use segment::{SegmentInfo, SegmentKind, SEGMENT_KINDS};
pub use snapshot::HeapSnapshot;
