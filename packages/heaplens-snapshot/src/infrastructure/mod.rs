//! Snapshot implementations

pub mod json;
pub mod memory;

pub use json::open;
pub use memory::{MemorySnapshot, SnapshotBuilder};
