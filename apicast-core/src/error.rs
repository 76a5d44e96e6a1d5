use thiserror::Error;

/// Failure of a single pipeline invocation (credential lookup, HTTP call, decoding).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The environment variable holding the API key is unset or empty.
    #[error("API key not found: environment variable {var} is not set")]
    CredentialMissing { var: String },

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status.
    #[error("API error: {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// A success response whose body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Coarse category of an [`ApiError`], for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    CredentialMissing,
    Transport,
    UpstreamStatus,
    MalformedResponse,
}

impl ApiError {
    pub fn reason(&self) -> ErrorReason {
        match self {
            ApiError::CredentialMissing { .. } => ErrorReason::CredentialMissing,
            ApiError::Transport(_) => ErrorReason::Transport,
            ApiError::UpstreamStatus { .. } => ErrorReason::UpstreamStatus,
            ApiError::MalformedResponse(_) => ErrorReason::MalformedResponse,
        }
    }

    /// HTTP status code, when upstream produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}
