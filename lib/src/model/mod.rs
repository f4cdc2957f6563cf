//! Supervised online models.
//!
//! | Model | Role |
//! |-------|------|
//! | [`LinearRegression`] | Regressor |
//! | [`LogisticRegression`] | BinaryClassifier |
//! | [`PAClassifier`] | BinaryClassifier |
//! | [`GaussianNB`] | MultiClassClassifier |
//! | [`OneVsRestClassifier`] | MultiClassClassifier |

pub mod linear;
pub mod naive_bayes;
pub mod one_vs_rest;
pub mod passive_aggressive;

pub use linear::{LinearConfig, LinearRegression, LogisticRegression};
pub use naive_bayes::GaussianNB;
pub use one_vs_rest::OneVsRestClassifier;
pub use passive_aggressive::{PAClassifier, PaMode};
