use thiserror::Error;

/// Errors that stop the process before any competition is attempted.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a single competition fetch.
///
/// `Transport` and `Status` are soft: the driver treats them as "no data".
/// `Malformed` means the API answered 200 with a body we cannot map, which
/// usually signals a change in the payload shape.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status { .. })
    }
}
