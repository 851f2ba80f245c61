//! Benchmarks for hlpdec.
//!
//! The benches live under `benches/`; this library only shares data
//! generators between them.

pub mod utils;
