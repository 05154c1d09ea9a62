use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The dataset is not laid out the way the requested instrument needs.
    #[error("Dataset shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("No price series for instrument '{0}'")]
    UnknownInstrument(String),

    #[error("Invalid price series: {0}")]
    InvalidSeries(#[from] CoreError),
}
