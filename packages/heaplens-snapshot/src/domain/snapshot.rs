//! Walkable heap snapshot abstraction
//!
//! A [`HeapSnapshot`] is an already-opened, read-only view of a frozen
//! managed heap: ordered segments, per-segment object enumeration in address
//! order, and type/size/string/field resolution for individual objects.
//!
//! The trait is object-safe so analyzers stay independent of the concrete
//! dump container. Implementations must tolerate any number of sequential
//! read passes but are not required to support concurrent readers; callers
//! serialize scans (the analysis session does this).

use super::object::{Address, FieldSlot, ObjectRecord, TypeId, TypeRecord};
use super::segment::SegmentInfo;
use crate::error::Result;

/// Read-only, ordered enumeration of a frozen managed heap
pub trait HeapSnapshot: Send + Sync {
    /// Segments in snapshot order
    fn segments(&self) -> &[SegmentInfo];

    /// Lazy object enumeration for one segment, in address order
    ///
    /// A mid-walk layout inconsistency (e.g. the dump captured a concurrent
    /// mutation state) surfaces as an `Err` item; enumeration must not be
    /// continued past it.
    fn objects(&self, segment: usize) -> Box<dyn Iterator<Item = Result<ObjectRecord>> + '_>;

    /// Number of types in the snapshot's type table; ids `0..type_count`
    /// resolve through [`type_record`](Self::type_record)
    fn type_count(&self) -> u32;

    /// Resolved type metadata, or `None` for an id this snapshot never issued
    fn type_record(&self, id: TypeId) -> Option<&TypeRecord>;

    /// Allocated size in bytes of the object at `address`
    fn object_size(&self, id: TypeId, address: Address) -> u64;

    /// Decode the character content of a string object
    fn string_value(&self, id: TypeId, address: Address) -> Result<String>;

    /// Reference-typed slots of the object at `address`
    fn fields(&self, address: Address) -> Box<dyn Iterator<Item = FieldSlot> + '_>;

    /// Character encoding width of the analyzed runtime, in bytes
    fn char_width_bytes(&self) -> u32 {
        2
    }

    /// Total number of objects, when known up front; used only for progress
    /// reporting and pre-sizing, never for correctness
    fn object_count_hint(&self) -> Option<u64> {
        None
    }
}
