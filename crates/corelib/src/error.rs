//! Core shared errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("smoothing rate {0} outside (0, 1]")]
    InvalidRate(f32),

    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
