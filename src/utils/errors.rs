use std::time::Duration;
use thiserror::Error;

/// Main error type for PinterPal
#[derive(Error, Debug)]
pub enum WidgetError {
    /// The call exceeded its deadline and was cancelled
    #[error("Request timed out after {} seconds", .after.as_secs())]
    Timeout { after: Duration },

    /// The service answered with a non-success status
    #[error("HTTP {status}: {}", body_or_placeholder(.body))]
    HttpError { status: u16, body: String },

    /// The reply was not valid JSON or lacked required fields
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Valid JSON whose stage the renderer cannot interpret
    #[error("Unrecognized stage: {0}")]
    UnrecognizedStage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn body_or_placeholder(body: &str) -> &str {
    if body.trim().is_empty() {
        "no body"
    } else {
        body
    }
}

impl WidgetError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            body: body.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError(message.into())
    }

    /// Short machine-readable kind, used in logs and JSON transcripts
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::HttpError { .. } => "http",
            Self::ProtocolError(_) => "protocol",
            Self::UnrecognizedStage(_) => "unrecognized_stage",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::ProtocolError(err.to_string())
    }
}

impl From<figment::Error> for WidgetError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_tolerates_empty_body() {
        let err = WidgetError::http(502, "");
        assert_eq!(err.to_string(), "HTTP 502: no body");

        let err = WidgetError::http(404, "not found");
        assert_eq!(err.to_string(), "HTTP 404: not found");
    }

    #[test]
    fn test_timeout_message() {
        let err = WidgetError::Timeout {
            after: Duration::from_secs(20),
        };
        assert_eq!(err.to_string(), "Request timed out after 20 seconds");
        assert_eq!(err.kind(), "timeout");
    }
}
