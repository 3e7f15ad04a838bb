use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryLayerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Index {index} is outside the valid range [0, {max}]")]
    OutOfRange { index: f64, max: f64 },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type BoundaryLayerResult<T> = Result<T, BoundaryLayerError>;
