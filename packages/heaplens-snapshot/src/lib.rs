//! heaplens-snapshot - Walkable heap snapshot abstraction
//!
//! Read-only view over a frozen snapshot of a managed process's
//! garbage-collected heap: ordered segments, lazy per-segment object
//! enumeration, and type/size/string/field resolution. A snapshot is opened
//! once per analysis session, used for one or more read passes, and released
//! by dropping it; it is never mutated.
//!
//! Two implementations ship here:
//!
//! - [`MemorySnapshot`] / [`SnapshotBuilder`] - programmatic construction for
//!   tests, benches and adapters
//! - [`infrastructure::json::open`] - JSON dump fixture adapter
//!
//! Product dump containers (crash dump formats, runtime metadata resolution)
//! belong to their own adapters; the analysis crate consumes only the
//! [`HeapSnapshot`] trait.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{
    Address, FieldDef, FieldSlot, HeapSnapshot, ObjectRecord, SegmentInfo, SegmentKind, TypeId,
    TypeRecord, GENERATION_SLOTS, NO_GENERATION, SEGMENT_KINDS,
};
pub use error::{ErrorKind, Result, SnapshotError};
pub use infrastructure::{open, MemorySnapshot, SnapshotBuilder};
