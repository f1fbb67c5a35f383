//! Batch Strategies
//!
//! Higher-throughput entry points over the single-message core.

pub mod parallel;

pub use parallel::query_parallel;
