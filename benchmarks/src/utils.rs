use std::time::Instant;

use streamlearn::dataset::SyntheticStream;
use streamlearn::{Estimator, Result};

/// Statistics for benchmarking results.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkStats {
    pub mean_us: f64,
    pub std_dev_us: f64,
    pub min_us: f64,
    pub max_us: f64,
    pub median_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
}

impl BenchmarkStats {
    /// Calculate statistics from a list of times in microseconds.
    ///
    /// Returns `None` for an empty list.
    pub fn from_times(mut times: Vec<f64>) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        times.sort_by(f64::total_cmp);

        let n = times.len();
        let mean = times.iter().sum::<f64>() / n as f64;
        let variance = times.iter().map(|&t| (t - mean).powi(2)).sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (times[n / 2 - 1] + times[n / 2]) / 2.0
        } else {
            times[n / 2]
        };
        let percentile = |q: f64| times[((n as f64 * q) as usize).min(n - 1)];

        Some(Self {
            mean_us: mean,
            std_dev_us: variance.sqrt(),
            min_us: times[0],
            max_us: times[n - 1],
            median_us: median,
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
        })
    }
}

/// Time every `update` of `estimator` over `stream`.
pub fn time_updates(
    estimator: &mut dyn Estimator,
    stream: &SyntheticStream,
) -> Result<Option<BenchmarkStats>> {
    let mut times = Vec::with_capacity(stream.len());
    for (x, y) in stream.iter() {
        let start = Instant::now();
        estimator.update(x, y)?;
        times.push(start.elapsed().as_secs_f64() * 1e6);
    }
    Ok(BenchmarkStats::from_times(times))
}
