//! Benchmark utilities for streamlearn.
//!
//! - Progressive validation metrics (predict, then learn, one observation at
//!   a time)
//! - Per-update latency statistics

pub mod metrics;
pub mod utils;

pub use metrics::ProgressiveMetrics;
pub use utils::{time_updates, BenchmarkStats};
