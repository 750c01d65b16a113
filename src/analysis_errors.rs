//! # Analysis Error Types Module
//!
//! Error types for the meal image analysis service. The bot maps each
//! variant to its own user-facing message.

/// Custom error types for meal analysis
#[derive(Debug, Clone)]
pub enum AnalysisError {
    /// Image rejected before upload (size, format)
    Validation(String),
    /// Transport or HTTP status failure talking to the vision API
    Request(String),
    /// The API did not answer within the configured time
    Timeout(String),
    /// The API answered, but not with the expected JSON object
    MalformedResponse(String),
    /// Too many recent failures, calls are suspended
    CircuitOpen,
}

impl AnalysisError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, AnalysisError::Request(_) | AnalysisError::Timeout(_))
    }
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AnalysisError::Request(msg) => write!(f, "Request error: {msg}"),
            AnalysisError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            AnalysisError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            AnalysisError::CircuitOpen => write!(f, "Analysis temporarily disabled after repeated failures"),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalysisError::Timeout(err.to_string())
        } else if err.is_decode() {
            AnalysisError::MalformedResponse(err.to_string())
        } else {
            AnalysisError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::MalformedResponse(err.to_string())
    }
}
