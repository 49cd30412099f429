use thiserror::Error;

/// Type alias for Result with WatchError
pub type Result<T> = std::result::Result<T, WatchError>;

/// Error types for the subject watcher
#[derive(Error, Debug)]
pub enum WatchError {
    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Credential acquisition or refresh failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Result log unreadable, unwritable or malformed
    #[error("Result log error: {0}")]
    StorageError(String),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl WatchError {
    /// True for any failure reported by (or on the way to) the Gmail API
    pub fn is_api_failure(&self) -> bool {
        matches!(
            self,
            WatchError::ApiError(_)
                | WatchError::RateLimitExceeded(_)
                | WatchError::NetworkError(_)
                | WatchError::ServerError { .. }
                | WatchError::MessageNotFound(_)
                | WatchError::BadRequest(_)
                | WatchError::Forbidden(_)
        )
    }
}

/// Delay-seconds value of a Retry-After header, if present and numeric
fn retry_after_secs<B>(response: &hyper::Response<B>) -> Option<u64> {
    response
        .headers()
        .get(hyper::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

impl From<google_gmail1::Error> for WatchError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            // HTTP response with status code (non-success responses)
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    429 => match retry_after_secs(response) {
                        Some(secs) => WatchError::RateLimitExceeded(format!(
                            "{} (retry after {}s)",
                            message, secs
                        )),
                        None => WatchError::RateLimitExceeded(message),
                    },
                    404 => WatchError::MessageNotFound("Resource not found".to_string()),
                    400 => WatchError::BadRequest(message),
                    401 => WatchError::AuthError(message),
                    403 => WatchError::Forbidden(message),
                    500..=599 => WatchError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => WatchError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => WatchError::BadRequest(format!("{}", err)),
            google_gmail1::Error::MissingToken(ref err) => {
                WatchError::AuthError(format!("No access token available: {}", err))
            }
            google_gmail1::Error::HttpError(ref err) => {
                WatchError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => WatchError::NetworkError(err.to_string()),
            _ => WatchError::ApiError(error.to_string()),
        }
    }
}
