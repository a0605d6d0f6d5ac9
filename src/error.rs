//! Error type for construction and training failures

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlendError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature shape mismatch: model has {actual} coefficients, features have {expected}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Dataset error: {0}")]
    Dataset(String),
}

pub type BlendResult<T> = std::result::Result<T, BlendError>;

pub fn invalid_config(msg: impl Into<String>) -> BlendError {
    BlendError::InvalidConfig(msg.into())
}
