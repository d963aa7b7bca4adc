use thiserror::Error;

/// Error types for the appointment-checklist library.
///
/// These are the faults that escape a generation call: transport failures,
/// service-side errors and configuration problems. A model response that is
/// not valid JSON is *not* an error; it is reported as
/// [`ChecklistResult::Failed`](crate::ChecklistResult::Failed).
///
/// # Examples
///
/// ```
/// use appointment_checklist::{ChecklistError, Result};
///
/// fn require_key(key: &str) -> Result<()> {
///     if key.is_empty() {
///         return Err(ChecklistError::ConfigError("API key cannot be empty".into()));
///     }
///     Ok(())
/// }
///
/// match require_key("") {
///     Ok(()) => println!("Key present"),
///     Err(ChecklistError::ConfigError(msg)) => println!("Bad configuration: {}", msg),
///     Err(e) => println!("Unexpected error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum ChecklistError {
    /// The generation service rejected the request or reported an error
    #[error("API error: {0}")]
    ApiError(String),

    /// A streamed event could not be decoded
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Operation timed out
    #[error("Timeout error")]
    Timeout,

    /// HTTP client error (from reqwest)
    #[cfg(feature = "gemini")]
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error (from serde_json)
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error, e.g. while starting a blocking runtime
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// HttpError, JsonError and IoError never compare equal: their sources
// don't implement PartialEq.
impl PartialEq for ChecklistError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ApiError(a), Self::ApiError(b)) => a == b,
            (Self::StreamError(a), Self::StreamError(b)) => a == b,
            (Self::ConfigError(a), Self::ConfigError(b)) => a == b,
            (Self::Timeout, Self::Timeout) => true,
            _ => false,
        }
    }
}

/// A specialized Result type for checklist operations.
pub type Result<T> = std::result::Result<T, ChecklistError>;
