use std::ops::Range;

use ndarray::Array2;
use rand::prelude::*;

use crate::dataset::StreamKind;
use crate::observation::{Label, Observation, Target};

/// Noise amplitude added to linear targets.
const NOISE: f64 = 0.1;

/// Finite, seeded stream of observations.
#[derive(Clone, Debug)]
pub struct SyntheticStream {
    kind: StreamKind,
    n_features: usize,
    samples: Vec<(Observation, Option<Target>)>,
}

impl SyntheticStream {
    /// Generate `n_samples` observations with `n_features` numeric features.
    ///
    /// Two calls with the same arguments produce identical streams.
    pub fn generate(kind: StreamKind, n_samples: usize, n_features: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weights: Vec<f64> = (0..n_features).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let centers: Vec<Vec<f64>> = match kind {
            StreamKind::MultiClassClassification { n_classes } => (0..n_classes.max(1))
                .map(|_| (0..n_features).map(|_| rng.gen_range(-2.0..2.0)).collect())
                .collect(),
            _ => Vec::new(),
        };

        let samples = (0..n_samples)
            .map(|_| match kind {
                StreamKind::MultiClassClassification { .. } => {
                    let class = rng.gen_range(0..centers.len());
                    let row: Vec<f64> = centers[class]
                        .iter()
                        .map(|c| c + rng.gen_range(-0.5..0.5))
                        .collect();
                    (to_observation(&row), Some(Target::Label(Label::Class(class as i64))))
                }
                _ => {
                    let row: Vec<f64> = (0..n_features).map(|_| rng.gen_range(-1.0..1.0)).collect();
                    let linear: f64 = row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>()
                        + NOISE * rng.gen_range(-1.0..1.0);
                    let target = match kind {
                        StreamKind::Regression => Some(Target::Real(linear)),
                        StreamKind::BinaryClassification => Some(Target::from(linear > 0.0)),
                        _ => None,
                    };
                    (to_observation(&row), target)
                }
            })
            .collect();

        Self {
            kind,
            n_features,
            samples,
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over `(observation, target)` pairs in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (&Observation, Option<&Target>)> {
        self.samples.iter().map(|(x, y)| (x, y.as_ref()))
    }

    /// Rows `range` as a dense matrix plus their targets.
    ///
    /// The range is clamped to the stream length.
    pub fn get_batch(&self, range: Range<usize>) -> (Array2<f64>, Option<Vec<Target>>) {
        let end = range.end.min(self.samples.len());
        let start = range.start.min(end);
        let rows = &self.samples[start..end];

        let mut x = Array2::zeros((rows.len(), self.n_features));
        for (i, (obs, _)) in rows.iter().enumerate() {
            for j in 0..self.n_features {
                x[[i, j]] = obs
                    .get(&feature_name(j))
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
            }
        }

        let y = if self.kind.is_labeled() {
            Some(rows.iter().filter_map(|(_, t)| t.clone()).collect())
        } else {
            None
        };
        (x, y)
    }

    /// The whole stream as one matrix.
    pub fn to_matrix(&self) -> (Array2<f64>, Option<Vec<Target>>) {
        self.get_batch(0..self.samples.len())
    }
}

/// Name of column `j` in generated and adapted observations.
pub fn feature_name(j: usize) -> String {
    format!("x{}", j)
}

fn to_observation(row: &[f64]) -> Observation {
    Observation::from_numeric(row.iter().enumerate().map(|(j, v)| (feature_name(j), *v)))
}
