//! Running statistics updated one value at a time.
//!
//! These are the building blocks of the incremental scalers, feature
//! selectors and naive Bayes. Each statistic is a small `Copy`-cheap struct
//! with an `update` method and a `get` accessor.
//!
//! | Statistic | Kind | Description |
//! |-----------|------|-------------|
//! | [`Mean`] | univariate | Running arithmetic mean |
//! | [`Variance`] | univariate | Welford variance with configurable `ddof` |
//! | [`Min`] / [`Max`] | univariate | Running extrema |
//! | [`Covariance`] | bivariate | Running co-moment |
//! | [`PearsonCorrelation`] | bivariate | Running correlation coefficient |

pub mod correlation;
pub mod moments;

pub use correlation::{Covariance, PearsonCorrelation};
pub use moments::{Max, Mean, Min, Variance};

/// A statistic over a single stream of values.
pub trait Univariate: Clone + std::fmt::Debug + Send {
    /// Fold one value into the statistic.
    fn update(&mut self, x: f64);
    /// Current value of the statistic.
    fn get(&self) -> f64;
}

/// A statistic over a stream of paired values.
pub trait Bivariate: Clone + std::fmt::Debug + Send {
    /// Fold one pair into the statistic.
    fn update(&mut self, x: f64, y: f64);
    /// Current value of the statistic.
    fn get(&self) -> f64;
}
