//! Error types for the MiniApp client.

use thiserror::Error;

/// An error response returned by the service (`success: false`).
///
/// The kind is derived from the HTTP status embedded in the trailing three
/// digits of the error code (e.g. `A000404` is a not-found error). Every
/// variant keeps the original code and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authentication failed (401).
    #[error("authentication failed [{code}]: {message}")]
    Auth { code: String, message: String },

    /// Access denied (403).
    #[error("access denied [{code}]: {message}")]
    Forbidden { code: String, message: String },

    /// Resource not found (404).
    #[error("not found [{code}]: {message}")]
    NotFound { code: String, message: String },

    /// Conflicting resource state (409).
    #[error("conflict [{code}]: {message}")]
    Conflict { code: String, message: String },

    /// Request failed validation (422).
    #[error("validation failed [{code}]: {message}")]
    Validation { code: String, message: String },

    /// Any other error code, including codes with no recognisable status.
    #[error("API error [{code}]: {message}")]
    Other { code: String, message: String },
}

impl ApiError {
    /// Classify an error code and message into an [`ApiError`].
    pub fn classify(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        match status_from_code(&code) {
            Some(401) => Self::Auth { code, message },
            Some(403) => Self::Forbidden { code, message },
            Some(404) => Self::NotFound { code, message },
            Some(409) => Self::Conflict { code, message },
            Some(422) => Self::Validation { code, message },
            _ => Self::Other { code, message },
        }
    }

    /// The service error code, e.g. `A000404`.
    pub fn code(&self) -> &str {
        match self {
            Self::Auth { code, .. }
            | Self::Forbidden { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::Validation { code, .. }
            | Self::Other { code, .. } => code,
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Auth { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Validation { message, .. }
            | Self::Other { message, .. } => message,
        }
    }

    /// The HTTP status embedded in the code, if it has one.
    pub fn status(&self) -> Option<u16> {
        status_from_code(self.code())
    }
}

/// Extract the HTTP status from an error code like `A000404`.
///
/// Codes shorter than seven characters, codes not starting with a letter,
/// and codes whose last three characters are not decimal digits yield
/// `None`.
pub fn status_from_code(code: &str) -> Option<u16> {
    if code.chars().count() < 7 || !code.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }
    let suffix = code.get(code.len().checked_sub(3)?..)?;
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Errors that can occur when using the MiniApp client.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection error (network failure, DNS resolution, timeout, etc.).
    #[error("connection error: {0}")]
    Connection(String),

    /// Non-2xx response from the storage endpoint during an upload.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The response body was not a valid envelope or payload.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// A request body could not be encoded as JSON.
    #[error("failed to serialize request: {0}")]
    Serialization(String),

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reading a local upload source failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The client was used after `close()`.
    #[error("client is closed")]
    Closed,

    /// The service answered with an error envelope.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Returns `true` for failures to communicate at all, as opposed to a
    /// well-formed error response.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Http { .. } | Self::Deserialization(_)
        )
    }

    /// Returns `true` if this is an API error.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Returns the API error if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the API error code if this is an API error.
    pub fn api_code(&self) -> Option<&str> {
        self.api_error().map(ApiError::code)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(ApiError::NotFound { .. }))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Api(ApiError::Auth { .. }))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Api(ApiError::Conflict { .. }))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
