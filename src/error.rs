//! Error handling for the application

use crate::pricing::{CatalogError, QuoteError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // caller should re-prompt with different selections
            AppError::Quote(_) => 2,
            AppError::Request(_) => 65,
            AppError::Catalog(_) | AppError::Config(_) => 78,
            AppError::Io(_) => 74,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
