// Fetch/aggregation error taxonomy. Display is the single user-visible message.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection refused, reset, DNS failure and the like.
    #[error("Network error: {0}")]
    Transport(String),

    /// Per-request timeout elapsed.
    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,

    /// Non-2xx response.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Wrong content type, invalid JSON, or a body of the wrong shape.
    #[error("Invalid response format: {0}")]
    Format(String),

    /// Structurally valid but empty result set.
    #[error("No {0} data available. Please try again later.")]
    EmptyData(&'static str),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::EmptyData(_))
    }

    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Timeout => "timeout",
            FetchError::Http { .. } => "http",
            FetchError::Format(_) => "format",
            FetchError::EmptyData(_) => "empty_data",
        }
    }
}
