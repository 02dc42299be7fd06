//! Benchmark support crate for steiner.
//!
//! Provides seeded random graphs and parameter types used by the Criterion
//! benchmarks for the shortest-path traversal and the rerouting pass.

pub mod error;
pub mod params;
pub mod source;
