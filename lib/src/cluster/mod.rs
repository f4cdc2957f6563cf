//! Online clustering.

pub mod kmeans;

pub use kmeans::{KMeans, KMeansConfig};
