//! API error taxonomy
//!
//! Every handler failure maps to exactly one variant, and every variant maps
//! to one HTTP status code plus a human-readable message. Internal failures
//! are carried as `anyhow` errors and surface as 500s without leaking detail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown step, game, gift, photo or player id
    #[error("{0}")]
    NotFound(String),

    /// Re-submission of an already recorded completion
    #[error("{0}")]
    AlreadyCompleted(String),

    /// Final answer did not match the expected answer
    #[error("Incorrect answer")]
    InvalidAnswer,

    /// Missing, malformed or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the admin role
    #[error("Admin access required")]
    Forbidden,

    /// Request body failed validation (shape, ranges, duplicates)
    #[error("{0}")]
    Invalid(String),

    /// Not enough points or gift stock to complete a purchase
    #[error("{0}")]
    Insufficient(String),

    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::AlreadyCompleted(_) => 400,
            AppError::InvalidAnswer => 400,
            AppError::Unauthorized(_) => 401,
            AppError::Forbidden => 403,
            AppError::Invalid(_) => 400,
            AppError::Insufficient(_) => 400,
            AppError::Internal(_) => 500,
        }
    }

    /// Message sent to the client. Internal errors are masked.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("database error"))
    }
}
