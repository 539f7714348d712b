use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid pool: {0}")]
    InvalidPool(String),

    #[error("Core error: {0}")]
    Core(#[from] ergoswap_core::CoreError),
}
