//! Error types for the SharePoint REST integration.
//!
//! All public API surfaces in this crate return `SharePointResult<T>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias.
pub type SharePointResult<T> = Result<T, SharePointError>;

/// Error codes specific to SharePoint REST operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharePointErrorCode {
    /// Authentication / token error (HTTP 401).
    AuthFailed,
    /// Insufficient permissions (HTTP 403).
    AccessDenied,
    /// Resource (page, item, file) not found (HTTP 404).
    NotFound,
    /// Conflict (checkout held by another user, save conflict) (HTTP 409).
    Conflict,
    /// Rate-limited / throttled (HTTP 429).
    RateLimited,
    /// Bad request / invalid parameter.
    InvalidRequest,
    /// The page has no server-side Id yet; create it before calling this.
    PageNotSaved,
    /// Malformed `$batch` request or response.
    BatchMalformed,
    /// Network / connectivity error.
    NetworkError,
    /// (De)serialization error, including malformed canvas / layout JSON.
    SerializationError,
    /// Catch-all internal error.
    InternalError,
}

impl fmt::Display for SharePointErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured error returned by every public function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointError {
    pub code: SharePointErrorCode,
    pub message: String,
    pub status: Option<u16>,
    /// Server error code, e.g. `-2130575338, Microsoft.SharePoint.SPException`.
    pub server_error_code: Option<String>,
    pub request_id: Option<String>,
}

impl fmt::Display for SharePointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref sc) = self.server_error_code {
            write!(f, " (server: {})", sc)?;
        }
        Ok(())
    }
}

impl std::error::Error for SharePointError {}

impl SharePointError {
    /// Create from a code + message.
    pub fn new(code: SharePointErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status: None,
            server_error_code: None,
            request_id: None,
        }
    }

    /// Shortcut: the page has never been saved server-side.
    pub fn page_not_saved() -> Self {
        Self::new(
            SharePointErrorCode::PageNotSaved,
            "The id for this page is null. To create a new page use ClientsidePages::create",
        )
    }

    /// Shortcut: network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::NetworkError, msg)
    }

    /// Shortcut: internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::InternalError, msg)
    }

    /// Shortcut: auth failure.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::AuthFailed, msg)
    }

    /// Shortcut: not found.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::NotFound, msg)
    }

    /// Shortcut: invalid request.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::InvalidRequest, msg)
    }

    /// Shortcut: malformed batch.
    pub fn batch(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::BatchMalformed, msg)
    }

    /// Build an error from a SharePoint REST error response body.
    pub fn from_rest_response(status: u16, body: &str) -> Self {
        let code = match status {
            401 => SharePointErrorCode::AuthFailed,
            403 => SharePointErrorCode::AccessDenied,
            404 => SharePointErrorCode::NotFound,
            409 => SharePointErrorCode::Conflict,
            429 => SharePointErrorCode::RateLimited,
            _ if status >= 500 => SharePointErrorCode::InternalError,
            _ => SharePointErrorCode::InvalidRequest,
        };

        let (server_code, server_msg, request_id) = Self::parse_rest_error_body(body);

        let message = server_msg
            .unwrap_or_else(|| format!("SharePoint REST error (HTTP {})", status));

        Self {
            code,
            message,
            status: Some(status),
            server_error_code: server_code,
            request_id,
        }
    }

    /// Try to extract the OData error envelope. Depending on the accept
    /// header the server uses either `{"odata.error": {...}}` or
    /// `{"error": {...}}`, and `message` is either a string or a
    /// `{ "lang": "...", "value": "..." }` object.
    fn parse_rest_error_body(body: &str) -> (Option<String>, Option<String>, Option<String>) {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
            return (None, None, None);
        };
        let err = if v["odata.error"].is_object() {
            &v["odata.error"]
        } else {
            &v["error"]
        };
        let code = err["code"].as_str().map(String::from);
        let msg = err["message"]["value"]
            .as_str()
            .or_else(|| err["message"].as_str())
            .map(String::from);
        let req_id = v["request-id"]
            .as_str()
            .or_else(|| err["innererror"]["request-id"].as_str())
            .map(String::from);
        (code, msg, req_id)
    }
}

impl From<reqwest::Error> for SharePointError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else {
            Self::internal(format!("HTTP error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SharePointError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            SharePointErrorCode::SerializationError,
            format!("JSON error: {}", err),
        )
    }
}

impl From<url::ParseError> for SharePointError {
    fn from(err: url::ParseError) -> Self {
        Self::new(
            SharePointErrorCode::InvalidRequest,
            format!("URL parse error: {}", err),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_not_saved() {
        let err = SharePointError::page_not_saved();
        assert_eq!(err.code, SharePointErrorCode::PageNotSaved);
        assert!(err.message.contains("id for this page is null"));
    }

    #[test]
    fn test_from_rest_response_verbose_envelope() {
        let body = r#"{"error":{"code":"-2130575338, Microsoft.SharePoint.SPException","message":{"lang":"en-US","value":"The file is checked out."}}}"#;
        let err = SharePointError::from_rest_response(409, body);
        assert_eq!(err.code, SharePointErrorCode::Conflict);
        assert_eq!(err.message, "The file is checked out.");
        assert_eq!(
            err.server_error_code.as_deref(),
            Some("-2130575338, Microsoft.SharePoint.SPException")
        );
    }

    #[test]
    fn test_from_rest_response_minimal_envelope() {
        let body = r#"{"odata.error":{"code":"-2147024891, System.UnauthorizedAccessException","message":{"lang":"en-US","value":"Access denied."}}}"#;
        let err = SharePointError::from_rest_response(403, body);
        assert_eq!(err.code, SharePointErrorCode::AccessDenied);
        assert_eq!(err.message, "Access denied.");
    }

    #[test]
    fn test_from_rest_response_429() {
        let err = SharePointError::from_rest_response(429, "");
        assert_eq!(err.code, SharePointErrorCode::RateLimited);
        assert_eq!(err.status, Some(429));
    }

    #[test]
    fn test_from_rest_response_500_non_json() {
        let err = SharePointError::from_rest_response(503, "Service Unavailable");
        assert_eq!(err.code, SharePointErrorCode::InternalError);
        assert!(err.message.contains("HTTP 503"));
    }

    #[test]
    fn test_error_display() {
        let err = SharePointError {
            code: SharePointErrorCode::NotFound,
            message: "missing".into(),
            status: Some(404),
            server_error_code: Some("-1, System.IO.FileNotFoundException".into()),
            request_id: None,
        };
        let s = format!("{}", err);
        assert!(s.contains("missing"));
        assert!(s.contains("FileNotFoundException"));
    }
}
