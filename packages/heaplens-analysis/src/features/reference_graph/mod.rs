//! Reverse reachability
//!
//! Explains, for a chosen set of objects, what other objects hold references
//! to them. The forward-only object graph is inverted by scanning every live
//! object's fields; discovered edges collapse per `(type, field)` and carry
//! a representative referrer chain for display and drill-down.

pub mod application;
pub mod domain;

pub use application::{GraphConfig, ReferenceGraphBuilder};
pub use domain::{
    describe_field_references, FieldReference, GraphStats, ReferenceGraph, ReferrerChain,
    ReferrerEdge, ReferrerResolution, TargetNode,
};
