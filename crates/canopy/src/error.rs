//! CLI error types.

use canopy_config::ConfigError;
use canopy_engine::EngineError;
use canopy_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Server(String),
}
