//! API Error Types
//!
//! Errors from the monitoring backend. `Display` is the text shown to the
//! operator, so server-provided messages pass through verbatim.

use serde_json::Value;
use thiserror::Error;

/// Monitoring backend errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Configured base URL cannot be used
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Classify a transport error the way the operator should see it
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable(e.to_string())
        } else {
            ApiError::Request(e)
        }
    }

    /// Build a status error from a response body.
    ///
    /// JSON bodies are searched for `detail`, `error` then `message`; other
    /// bodies are used as-is; an empty body falls back to the status line.
    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            message: extract_message(status, body),
        }
    }

    /// HTTP status, when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn extract_message(status: u16, body: &str) -> String {
    let body = body.trim();

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            match object.get(key) {
                Some(Value::String(s)) => {
                    if !s.is_empty() {
                        return s.clone();
                    }
                }
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    if body.is_empty() {
        format!("Request failed with status code {}", status)
    } else {
        body.to_string()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_detail() {
        let err = ApiError::from_response(400, r#"{"detail": "Patient already exists", "error": "x"}"#);
        assert_eq!(err.to_string(), "Patient already exists");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_message_falls_back_through_keys() {
        let err = ApiError::from_response(500, r#"{"message": "boom"}"#);
        assert_eq!(err.to_string(), "boom");

        let err = ApiError::from_response(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Bad Gateway");

        let err = ApiError::from_response(404, "");
        assert_eq!(err.to_string(), "Request failed with status code 404");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_structured_detail_is_rendered_as_json() {
        let err = ApiError::from_response(422, r#"{"detail": [{"msg": "field required"}]}"#);
        assert_eq!(err.to_string(), r#"[{"msg":"field required"}]"#);
    }
}
