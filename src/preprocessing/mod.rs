//! Data preprocessing: imputation, one-hot encoding, scaling and the
//! column-wise pipeline that combines them.

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::{FittedOneHotEncoder, OneHotEncoder};
pub use imputer::{CategoryFill, ImputeStrategy, NumericFill};
pub use pipeline::{ColumnPreprocessor, FittedPreprocessor};
pub use scaler::{FittedScaler, StandardScaler};
