//! Benchmark infrastructure for the property access fast path
//!
//! This crate provides benchmarking tools to measure how named property
//! accesses perform through the inline caches. It includes:
//!
//! - Micro-benchmark scenarios built directly as bytecode
//! - Benchmark runner with timing, access statistics and result formatting
//!
//! # Examples
//!
//! ```rust,no_run
//! use benchmarks::micro;
//! use interpreter::RuntimeConfig;
//!
//! let results = micro::run_all(&RuntimeConfig::default());
//! for result in results {
//!     println!("{}: {:.2}ms", result.name, result.duration_ms);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod micro;
pub mod runner;

pub use runner::{Benchmark, BenchmarkResult, BenchmarkSuite};
