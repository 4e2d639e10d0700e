use thiserror::Error;

/// Top-level error type for lanscope.
#[derive(Error, Debug)]
pub enum LanscopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LanscopeError>;
