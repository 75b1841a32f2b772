//! Graph construction

mod builder;

pub use builder::{GraphConfig, ReferenceGraphBuilder};
