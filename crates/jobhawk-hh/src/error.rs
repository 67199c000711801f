use thiserror::Error;

use jobhawk_core::types::ApiError;

/// Errors from the hh.ru adapter.
#[derive(Debug, Error)]
pub enum HhError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// hh.ru demands a prescreening test before a response is accepted.
    #[error("prescreening test required")]
    TestRequired,

    #[error("hh API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Parse(String),
}

impl From<HhError> for ApiError {
    fn from(e: HhError) -> Self {
        match e {
            HhError::TestRequired => ApiError::TestRequired,
            HhError::Api { status, message } => ApiError::Api { status, message },
            HhError::Transport(e) => ApiError::Transport(e.to_string()),
            HhError::Parse(msg) => ApiError::Parse(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, HhError>;
