//! Scaling transformers for feature normalization.
//!
//! | Transformer | Description | Use Case |
//! |-------------|-------------|----------|
//! | [`StandardScaler`] | Running z-score normalization | Default choice for linear models |
//! | [`MinMaxScaler`] | Scale to [0, 1] or a custom range | When bounded output is needed |

pub mod minmax;
pub mod standard;

pub use minmax::{MinMaxScaler, MinMaxScalerConfig};
pub use standard::{StandardScaler, StandardScalerConfig};
