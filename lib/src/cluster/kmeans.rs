//! Incremental k-means.
//!
//! Each update moves the closest center towards the observation by a fixed
//! fraction `halflife`:
//! ```text
//! c_i <- c_i + halflife * (x_i - c_i)
//! ```
//! Center coordinates are created lazily the first time a feature is seen,
//! drawn from `N(mu, sigma)` with a seeded generator.

use crate::error::{EstimatorError, Result};
use crate::estimator::{Estimator, Role};
use crate::observation::{Observation, Prediction, Target};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for KMeans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    pub n_clusters: usize,
    /// Fraction of the distance a center moves on each update.
    pub halflife: f64,
    /// Mean of the initial coordinate distribution.
    pub mu: f64,
    /// Standard deviation of the initial coordinate distribution.
    pub sigma: f64,
    pub random_state: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            halflife: 0.5,
            mu: 0.0,
            sigma: 1.0,
            random_state: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct KMeans {
    config: KMeansConfig,
    centers: Vec<BTreeMap<String, f64>>,
    /// Initial coordinate distribution; standard normal when unset.
    init: Option<Normal<f64>>,
    rng: StdRng,
    n_updates: u64,
}

impl KMeans {
    /// Create a clusterer with `n_clusters` centers.
    ///
    /// Zero clusters is treated as one.
    pub fn new(n_clusters: usize) -> Self {
        let config = KMeansConfig {
            n_clusters: n_clusters.max(1),
            ..KMeansConfig::default()
        };
        Self {
            centers: vec![BTreeMap::new(); config.n_clusters],
            init: None,
            rng: StdRng::seed_from_u64(config.random_state),
            config,
            n_updates: 0,
        }
    }

    /// Seed the generator used to initialize center coordinates.
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.config.random_state = seed;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Set the update step.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] unless `0 < halflife <= 1`.
    pub fn with_halflife(mut self, halflife: f64) -> Result<Self> {
        if !(halflife > 0.0 && halflife <= 1.0) {
            return Err(EstimatorError::InvalidParameter(format!(
                "KMeans halflife must lie in (0, 1], got {}",
                halflife
            )));
        }
        self.config.halflife = halflife;
        Ok(self)
    }

    /// Set the distribution of initial coordinates.
    ///
    /// # Errors
    /// Returns [`EstimatorError::InvalidParameter`] for a negative or
    /// non-finite `sigma`.
    pub fn with_init(mut self, mu: f64, sigma: f64) -> Result<Self> {
        if !sigma.is_finite() {
            return Err(EstimatorError::InvalidParameter(format!(
                "KMeans sigma must be finite, got {}",
                sigma
            )));
        }
        let init = Normal::new(mu, sigma).map_err(|e| {
            EstimatorError::InvalidParameter(format!("KMeans init N({}, {}): {}", mu, sigma, e))
        })?;
        self.init = Some(init);
        self.config.mu = mu;
        self.config.sigma = sigma;
        Ok(self)
    }

    pub fn centers(&self) -> &[BTreeMap<String, f64>] {
        &self.centers
    }

    fn distance(&self, center: &BTreeMap<String, f64>, features: &[(&str, f64)]) -> f64 {
        features
            .iter()
            .map(|(name, value)| {
                let c = center.get(*name).copied().unwrap_or(self.config.mu);
                (value - c).powi(2)
            })
            .sum()
    }

    fn closest(&self, features: &[(&str, f64)]) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, center) in self.centers.iter().enumerate() {
            let d = self.distance(center, features);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        best
    }
}

impl Estimator for KMeans {
    fn name(&self) -> String {
        "KMeans".to_string()
    }

    fn role(&self) -> Role {
        Role::Clusterer
    }

    fn update(&mut self, x: &Observation, _y: Option<&Target>) -> Result<()> {
        let features = x.numeric_features()?;

        let init = self.init;
        for center in self.centers.iter_mut() {
            for (name, _) in &features {
                if !center.contains_key(*name) {
                    let c = match init {
                        Some(normal) => normal.sample(&mut self.rng),
                        None => StandardNormal.sample(&mut self.rng),
                    };
                    center.insert(name.to_string(), c);
                }
            }
        }

        let closest = self.closest(&features);
        let halflife = self.config.halflife;
        let center = &mut self.centers[closest];
        for (name, value) in features {
            if let Some(c) = center.get_mut(name) {
                *c += halflife * (value - *c);
            }
        }
        self.n_updates += 1;
        Ok(())
    }

    fn predict(&self, x: &Observation) -> Result<Prediction> {
        if self.n_updates == 0 {
            return Err(EstimatorError::NotFitted {
                estimator: self.name(),
            });
        }
        let features = x.numeric_features()?;
        Ok(Prediction::Cluster(self.closest(&features)))
    }

    fn n_clusters(&self) -> Option<usize> {
        Some(self.config.n_clusters)
    }

    fn box_clone(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(a: f64, b: f64) -> Observation {
        Observation::from_numeric([("a", a), ("b", b)])
    }

    #[test]
    fn test_kmeans_not_fitted() {
        let model = KMeans::new(3);
        assert!(model.predict(&obs(0.0, 0.0)).unwrap_err().is_not_fitted());
    }

    #[test]
    fn test_kmeans_assignments_within_range() {
        let mut model = KMeans::new(5).with_random_state(42);
        for i in 0..30 {
            let v = i as f64 / 10.0;
            model.update(&obs(v, -v), None).unwrap();
            match model.predict(&obs(v, -v)).unwrap() {
                Prediction::Cluster(c) => assert!(c < 5),
                other => panic!("unexpected prediction {:?}", other),
            }
        }
        assert_eq!(model.n_clusters(), Some(5));
    }

    #[test]
    fn test_kmeans_same_seed_same_centers() {
        let mut a = KMeans::new(3).with_random_state(7);
        let mut b = KMeans::new(3).with_random_state(7);
        for i in 0..10 {
            a.update(&obs(i as f64, 1.0), None).unwrap();
            b.update(&obs(i as f64, 1.0), None).unwrap();
        }
        assert_eq!(a.centers(), b.centers());
    }

    #[test]
    fn test_kmeans_closest_center_moves_halfway() {
        let mut model = KMeans::new(1).with_init(0.0, 0.0).unwrap();
        model.update(&obs(2.0, 4.0), None).unwrap();
        assert_eq!(model.centers()[0]["a"], 1.0);
        assert_eq!(model.centers()[0]["b"], 2.0);
    }

    #[test]
    fn test_kmeans_separates_two_groups() {
        let mut model = KMeans::new(2).with_random_state(42);
        for _ in 0..50 {
            model.update(&obs(-5.0, -5.0), None).unwrap();
            model.update(&obs(5.0, 5.0), None).unwrap();
        }
        assert_ne!(
            model.predict(&obs(-5.0, -5.0)).unwrap(),
            model.predict(&obs(5.0, 5.0)).unwrap()
        );
    }

    #[test]
    fn test_kmeans_invalid_init() {
        let err = KMeans::new(2).with_init(0.0, -1.0).unwrap_err();
        assert!(matches!(err, EstimatorError::InvalidParameter(_)));
        assert!(KMeans::new(2).with_init(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_kmeans_init_draws_around_mu() {
        let mut model = KMeans::new(4).with_init(100.0, 1.0).unwrap().with_random_state(3);
        model.update(&obs(100.0, 100.0), None).unwrap();
        for center in model.centers() {
            for c in center.values() {
                assert!((c - 100.0).abs() < 10.0, "coordinate {} far from mu", c);
            }
        }
    }

    #[test]
    fn test_kmeans_invalid_halflife() {
        assert!(KMeans::new(2).with_halflife(0.0).is_err());
        assert!(KMeans::new(2).with_halflife(1.5).is_err());
    }
}
