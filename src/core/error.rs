use thiserror::Error;

/// Centralized error types for the application
///
/// Store, model and transport failures are converted to this enum so the
/// conversation engine can decide in one place whether a turn degrades
/// gracefully or aborts with an apology.
///
/// # Example
///
/// ```no_run
/// use lernbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Airtable answered with a non-success status
    #[error("Airtable error ({status}): {message}")]
    Airtable { status: reqwest::StatusCode, message: String },

    /// Mistral AI answered with an error or an unusable completion
    #[error("Mistral AI error: {0}")]
    Mistral(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors from other endpoints
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns true for failures worth retrying: transport errors, rate limiting and 5xx answers
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Airtable { status, .. } | AppError::HttpStatus(status) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            AppError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
