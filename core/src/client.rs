//! HTTP request builder and response parser for the notes API.
//!
//! # Design
//! `NotesClient` holds the base URL and a `SessionStore`; it never performs
//! I/O itself. Each operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes the matching
//! `HttpResponse`. The only side effects are on the session store: a
//! successful login writes the token and `logout` removes it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{extract_error_message, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
use crate::session::SessionStore;
use crate::types::{Credentials, LoginResponse, Note, NoteId, NoteInput, UserProfile};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const PROFILE_PATH: &str = "/api/auth/me";
pub const NOTES_PATH: &str = "/api/notes";

/// How a non-2xx status is reported for a given operation.
#[derive(Debug, Clone, Copy)]
enum FailureKind {
    /// Every failure is an authentication failure (login, profile).
    Auth,
    /// 401/403 are authentication failures, anything else is a request failure.
    AuthIfUnauthorized,
    /// Every failure is a request failure; the status still travels along.
    Request,
}

/// Client for the notes backend.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct NotesClient<S> {
    base_url: String,
    session: S,
}

impl<S: SessionStore> NotesClient<S> {
    /// An empty `base_url` keeps every request path relative.
    pub fn new(base_url: &str, session: S) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Prefix `path` with the base URL unless it is already absolute.
    pub fn resolve_url(&self, path: &str) -> String {
        if self.base_url.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn token(&self) -> Option<String> {
        self.session.get().filter(|token| !token.trim().is_empty())
    }

    /// True iff a session token is stored. No network call.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Drop the stored session token.
    pub fn logout(&self) {
        self.session.clear();
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url: self.resolve_url(path),
            headers,
            body,
        }
    }

    fn note_path(id: &NoteId) -> String {
        format!("{NOTES_PATH}/{}", urlencoding::encode(&id.to_string()))
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = to_json(credentials)?;
        let mut req = self.request(HttpMethod::Post, LOGIN_PATH, Some(body));
        // Login never carries a stale token.
        req.headers.retain(|(name, _)| name != "authorization");
        Ok(req)
    }

    pub fn build_profile(&self) -> HttpRequest {
        self.request(HttpMethod::Get, PROFILE_PATH, None)
    }

    pub fn build_list_notes(&self) -> HttpRequest {
        self.request(HttpMethod::Get, NOTES_PATH, None)
    }

    pub fn build_create_note(&self, input: &NoteInput) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, NOTES_PATH, Some(body)))
    }

    pub fn build_update_note(&self, id: &NoteId, input: &NoteInput) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Put, &Self::note_path(id), Some(body)))
    }

    pub fn build_delete_note(&self, id: &NoteId) -> HttpRequest {
        self.request(HttpMethod::Delete, &Self::note_path(id), None)
    }

    /// Parse a login response, storing the access token when one is present.
    ///
    /// A rejected login leaves any previously stored token untouched.
    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        let body = check_status(&response, FailureKind::Auth)?;
        let login = match body.into_json() {
            Some(value) => from_value::<LoginResponse>(value)?,
            None => LoginResponse::default(),
        };
        if let Some(token) = login.access_token.as_deref().filter(|t| !t.is_empty()) {
            self.session.set(token);
        }
        Ok(login)
    }

    pub fn parse_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        let body = check_status(&response, FailureKind::Auth)?;
        match body.into_json() {
            Some(value) => from_value(value),
            None => Err(ApiError::Deserialization("expected a JSON profile".to_string())),
        }
    }

    /// Anything other than a JSON array is read as "no notes".
    pub fn parse_list_notes(&self, response: HttpResponse) -> Result<Vec<Note>, ApiError> {
        let body = check_status(&response, FailureKind::AuthIfUnauthorized)?;
        match body.into_json() {
            Some(value @ Value::Array(_)) => from_value(value),
            _ => Ok(Vec::new()),
        }
    }

    pub fn parse_create_note(&self, response: HttpResponse) -> Result<Note, ApiError> {
        parse_note(response)
    }

    /// An unknown id comes back as `ApiError::Request` with status 404.
    pub fn parse_update_note(&self, response: HttpResponse) -> Result<Note, ApiError> {
        parse_note(response)
    }

    pub fn parse_delete_note(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, FailureKind::Request)?;
        Ok(())
    }
}

fn parse_note(response: HttpResponse) -> Result<Note, ApiError> {
    let body = check_status(&response, FailureKind::Request)?;
    match body.into_json() {
        Some(value) => from_value(value),
        None => Err(ApiError::Deserialization("expected a JSON note".to_string())),
    }
}

/// Normalize the body and turn non-2xx statuses into errors.
fn check_status(response: &HttpResponse, kind: FailureKind) -> Result<ResponseBody, ApiError> {
    let body = response.body();
    if response.is_success() {
        return Ok(body);
    }
    let status = response.status;
    let message = extract_error_message(body.json(), body.text(), status);
    let auth = match kind {
        FailureKind::Auth => true,
        FailureKind::AuthIfUnauthorized => matches!(status, 401 | 403),
        FailureKind::Request => false,
    };
    if auth {
        Err(ApiError::Auth { status, message })
    } else {
        Err(ApiError::Request { status, message })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}
