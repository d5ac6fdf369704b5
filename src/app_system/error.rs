use thiserror::Error;

use crate::cart_actor::CartError;
use crate::remote::ApiError;
use crate::session::SessionError;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors from starting, driving or stopping the storefront system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}
