//! Deduplication domain model

mod summary;
mod tally;

pub use summary::{StringItem, StringSummary};
pub use tally::ObjectTally;
