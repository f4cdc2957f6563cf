//! Categorical feature encoding.
//!
//! ## OneHotEncoder
//! Converts categorical values to numeric indicator features.
//!
//! ```text
//! {color: "red"}  ->  {color_blue: 0, color_red: 1}
//! ```

mod one_hot;

pub use one_hot::OneHotEncoder;
