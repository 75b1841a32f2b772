//! String deduplication
//!
//! Quantifies memory wasted by duplicate string content: one full pass over
//! the heap aggregates every string object by decoded content, then reports
//! per-content occurrence counts, segment/generation distributions and
//! wasted bytes.

pub mod application;
pub mod domain;

pub use application::{DedupConfig, StringDedupAnalyzer};
pub use domain::{ObjectTally, StringItem, StringSummary};
