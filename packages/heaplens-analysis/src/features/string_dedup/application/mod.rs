//! Deduplication scan

mod analyzer;

pub use analyzer::{DedupConfig, StringDedupAnalyzer};
