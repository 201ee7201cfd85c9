//! CLI command implementations.
//!
//! Each command writes its user-facing output to the given writer and
//! reports failures through [`CliError`].

pub mod cart;
pub mod session;
pub mod storage;
pub mod wishlist;

use thiserror::Error;
use vtu_dashboard_client::{CodecError, ConfigError, StorageError, StoreError};
use vtu_dashboard_core::{IdError, ProductId};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The environment configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session codec could not be created.
    #[error("session codec error: {0}")]
    Codec(#[from] CodecError),

    /// The store rejected the input.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Storage could not be read or written.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// A product id argument is empty or too long.
    #[error("invalid product id: {0}")]
    InvalidId(#[from] IdError),

    /// Input JSON could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command needs a signed-in user.
    #[error("sign in first: run `vtu-cli session sign-in <file>`")]
    SignInRequired,

    /// A blob did not decode with the configured secret.
    #[error("blob could not be decoded with the configured secret")]
    Undecodable,

    /// A value could not be encoded.
    #[error("value could not be encoded")]
    Unencodable,

    /// The session was accepted but could not be written to storage.
    #[error("session could not be saved to storage")]
    PersistFailed,
}

/// Parse a product id argument.
pub fn product_id(raw: &str) -> Result<ProductId, CliError> {
    Ok(ProductId::parse(raw)?)
}
