//! modforge benchmarking suite
//!
//! Benchmarks for version selection, constraint parsing and full resolution
//! against generated in-memory catalogs.

pub mod common;

pub use common::*;
