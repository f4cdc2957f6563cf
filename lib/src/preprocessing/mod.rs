//! Incremental preprocessing transformers.
//!
//! All transformers here have the [`Role::Transformer`](crate::estimator::Role)
//! role: they learn running statistics in `update` and rewrite observations in
//! `transform`, so they can head a [`Pipeline`](crate::compose::Pipeline) or be
//! merged in a [`TransformerUnion`](crate::compose::TransformerUnion).
//!
//! # Available Transformers
//!
//! ## Scaling
//! - [`StandardScaler`]: Running z-score normalization
//! - [`MinMaxScaler`]: Scale to [0, 1] or a custom range
//!
//! ## Feature engineering
//! - [`PolynomialExtender`]: Polynomial and interaction features
//!
//! ## Encoding
//! - [`OneHotEncoder`]: Indicator features for categorical values
//!
//! # Example
//!
//! ```
//! use streamlearn::compose::parallel;
//! use streamlearn::estimator::Estimator;
//! use streamlearn::observation::Observation;
//! use streamlearn::preprocessing::{MinMaxScaler, StandardScaler};
//!
//! let mut union = parallel(MinMaxScaler::new(), StandardScaler::new()).unwrap();
//! union.update(&Observation::from_numeric([("x", 1.0)]), None).unwrap();
//! let out = union.transform(&Observation::from_numeric([("x", 1.0)])).unwrap();
//! assert!(out.contains("MinMaxScaler__x"));
//! assert!(out.contains("StandardScaler__x"));
//! ```

pub mod encoding;
pub mod feature_engineering;
pub mod scaling;

pub use encoding::OneHotEncoder;
pub use feature_engineering::PolynomialExtender;
pub use scaling::{MinMaxScaler, MinMaxScalerConfig, StandardScaler, StandardScalerConfig};
