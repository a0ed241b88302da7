//! Client error types.
//!
//! Every failure surfaced by the client is one of five variants. Callers
//! branch on the variant (or on [`Error::kind`]) instead of inspecting
//! error types at runtime.

use std::fmt;

use thiserror::Error;

use crate::client::Response;
use crate::rate::Rate;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid client setup: bad base URL, missing context, unusable request.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The registry answered with a non-2xx status other than 429.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The registry answered 429 Too Many Requests.
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    /// A response body could not be decoded as JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The exchange failed below the HTTP layer, or the context ended.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Discriminant for [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Configuration`].
    Configuration,
    /// See [`Error::Api`].
    Api,
    /// See [`Error::RateLimit`].
    RateLimit,
    /// See [`Error::Decode`].
    Decode,
    /// See [`Error::Transport`].
    Transport,
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// The variant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Api(_) => ErrorKind::Api,
            Error::RateLimit(_) => ErrorKind::RateLimit,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Transport(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status code, if the registry answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(e) => Some(e.status()),
            Error::RateLimit(e) => Some(e.response.status),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.status() == 404)
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimit(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api(e) if e.status() >= 500)
    }

    /// Check if the operation ended because its context was canceled or expired.
    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::Canceled | TransportError::DeadlineExceeded)
        )
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Network-level failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request context was canceled.
    #[error("context canceled")]
    Canceled,

    /// The request context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The HTTP exchange itself failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Copying the response body into a caller-supplied sink failed.
    #[error("failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::Http(err))
    }
}

/// One field-level entry of an error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// Offending field.
    #[serde(default)]
    pub field: String,
    /// What is wrong with it.
    #[serde(default)]
    pub message: String,
}

/// Error response from the registry.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Metadata of the failed response.
    pub response: Response,
    /// Message reported by the registry.
    pub message: String,
    /// Per-field details, possibly empty.
    pub errors: Vec<FieldError>,
}

impl ApiError {
    /// HTTP status code of the failed response.
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error ({}): {}", self.status(), self.message)?;
        if !self.errors.is_empty() {
            let details: Vec<String> = self
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            write!(f, " [{}]", details.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// The registry refused the request because the rate limit is exhausted.
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Metadata of the 429 response.
    pub response: Response,
    /// Rate state parsed from the 429 response.
    pub rate: Rate,
    /// Message reported by the registry.
    pub message: String,
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rate limit exceeded: {}", self.message)?;
        if let Some(reset) = self.rate.reset {
            write!(f, " (resets at {})", reset.to_rfc3339())?;
        }
        Ok(())
    }
}

impl std::error::Error for RateLimitError {}

/// Error payload returned by the registry.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}
