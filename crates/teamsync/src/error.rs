//! Error types for SCIM and GitHub operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur while reconciling groups with teams.
///
/// Status-bearing variants name the operation that failed and keep the raw
/// response body so the failing call can be diagnosed from the message alone.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never produced a response (connect failure, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// A response body could not be decoded.
    #[error("Failed to decode response while trying to {operation}: {source}")]
    Json {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// 401 or 403: bad, missing or under-scoped token.
    #[error("Authentication failed while trying to {operation}. Status: {status}, Error: {body}")]
    Auth {
        operation: String,
        status: u16,
        body: String,
    },

    /// 404 from the remote API.
    #[error("Not found while trying to {operation}: {body}")]
    NotFound { operation: String, body: String },

    /// 409 or 422: duplicate names, invalid payloads.
    #[error("Request rejected while trying to {operation}. Status: {status}, Error: {body}")]
    Rejected {
        operation: String,
        status: u16,
        body: String,
    },

    /// Any other non-success status.
    #[error("Failed to {operation}. Status: {status}, Error: {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    /// A group id that has to be numeric at an API boundary is not.
    #[error("Group id '{id}' is not numeric; the GitHub external-groups API needs a numeric id")]
    InvalidGroupId { id: String },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Classify a non-success response.
    pub fn from_status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let operation = operation.into();
        let body = body.into();
        match status {
            401 | 403 => Self::Auth {
                operation,
                status,
                body,
            },
            404 => Self::NotFound { operation, body },
            409 | 422 => Self::Rejected {
                operation,
                status,
                body,
            },
            _ => Self::Api {
                operation,
                status,
                body,
            },
        }
    }

    /// Create a decode error.
    #[inline]
    pub fn json(operation: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            operation: operation.into(),
            source,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Rejected { status, .. } | Self::Api { status, .. } => {
                Some(*status)
            }
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[inline]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps progress lines
/// readable when a response body spans several lines.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_auth() {
        for status in [401, 403] {
            let err = SyncError::from_status("list teams", status, "Bad credentials");
            assert!(err.is_auth());
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_from_status_classifies_not_found() {
        let err = SyncError::from_status("list teams", 404, "Not Found");
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("list teams"));
    }

    #[test]
    fn test_from_status_classifies_rejections() {
        let err = SyncError::from_status("create team", 422, "name already exists");
        assert!(matches!(err, SyncError::Rejected { status: 422, .. }));
        let err = SyncError::from_status("create team", 409, "conflict");
        assert!(matches!(err, SyncError::Rejected { status: 409, .. }));
    }

    #[test]
    fn test_from_status_falls_back_to_api() {
        let err = SyncError::from_status("link team", 502, "Bad Gateway");
        assert!(matches!(err, SyncError::Api { status: 502, .. }));
    }

    #[test]
    fn test_message_carries_status_and_body() {
        let err = SyncError::from_status(
            "link team platform to group 7",
            422,
            r#"{"message":"Validation Failed"}"#,
        );
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("Validation Failed"));
        assert!(msg.contains("link team platform to group 7"));
    }

    #[test]
    fn test_status_absent_for_non_http_errors() {
        let err = SyncError::InvalidGroupId {
            id: "abc".to_string(),
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("abc"));

        let err = SyncError::Http(HttpError::Transport("timed out".to_string()));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = SyncError::from_status("list groups", 500, "line one\nline two");
        assert_eq!(
            short_error_message(&err),
            "Failed to list groups. Status: 500, Error: line one"
        );
    }
}
