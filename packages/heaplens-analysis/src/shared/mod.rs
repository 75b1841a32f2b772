//! Shared analysis primitives

pub mod cancellation;

pub use cancellation::CancellationToken;
