//! Error types for the notes API client.
//!
//! # Design
//! Callers care about two kinds of failure: authentication failures, which
//! force the session back to the login view, and everything else, which is
//! shown to the user while the current view stays put. `ApiError::kind`
//! collapses the variants into those two kinds. Variants that came from an
//! HTTP response keep the status code so callers can still tell a 404 from
//! a 422 or a 503.

use serde_json::Value;

/// The two failure kinds the session controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Request,
}

/// Errors returned by `NotesClient` and `NotesController`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the credentials or the session token.
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// The backend answered with any other non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// An operation that needs a session was attempted without one.
    #[error("not logged in")]
    NotAuthenticated,

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(String),

    /// A success response did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("could not encode request: {0}")]
    Serialization(String),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Auth { .. } | ApiError::NotAuthenticated => ErrorKind::Auth,
            _ => ErrorKind::Request,
        }
    }

    /// HTTP status of the response that caused the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { status, .. } | ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend refused the session (401/403) or there is none.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated) || matches!(self.status(), Some(401 | 403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Pick the user-facing message for a failed response.
///
/// Priority: a `message` field, then a `detail` field of the JSON body, then
/// the raw text of a non-JSON body, then `HTTP <status>`. Empty values are
/// skipped at every step.
pub fn extract_error_message(json: Option<&Value>, text: Option<&str>, status: u16) -> String {
    if let Some(body) = json {
        if let Some(message) = body.get("message").and_then(field_text) {
            return message;
        }
        if let Some(detail) = body.get("detail").and_then(field_text) {
            return detail;
        }
    }
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        return text.to_string();
    }
    format!("HTTP {status}")
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // Validation error lists: [{"loc": [...], "msg": "...", ...}, ...]
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                (!items.is_empty()).then(|| value.to_string())
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}
