//! Reference graph domain model

mod field_reference;
mod graph;

pub use field_reference::{describe_field_references, FieldReference, ReferrerChain};
pub use graph::{GraphStats, ReferenceGraph, ReferrerEdge, ReferrerResolution, TargetNode};
