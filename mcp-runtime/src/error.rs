use thiserror::Error;

/// Failures of the Attention API client. These propagate unchanged up to the
/// tool dispatcher, which is the only place they are turned into text.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credential or unusable base URL; raised before any request.
    #[error("{0}")]
    Config(String),

    /// Non-2xx response from the API. Never retried.
    #[error("Attention API returned HTTP {status}: {body}")]
    Request { status: u16, body: String },

    #[error("Failed to reach Attention API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON in Attention API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("days_back {0} is out of range")]
    DaysBackOutOfRange(i64),
}

impl Error {
    /// Machine-readable code, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Request { .. } => "request_failed",
            Error::Transport(_) => "connection_error",
            Error::Decode(_) => "decode_error",
            Error::DaysBackOutOfRange(_) => "validation_failed",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
