//! Error types for the Telegram pipeline.

use leave_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur in the Telegram pipeline.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// TELEGRAM_API_URL is not a URL.
    #[error("Invalid Bot API URL: {0}")]
    InvalidApiUrl(String),

    /// Bot API request failed or was refused.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// A write that must not be dropped failed.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<teloxide::RequestError> for TelegramError {
    fn from(e: teloxide::RequestError) -> Self {
        TelegramError::HttpError(e.to_string())
    }
}
