//! Session/view state machine on top of `NotesClient`.
//!
//! # Design
//! The controller owns the in-memory copy of the profile and notes and
//! decides which view the user sees. Every action issues at most one request
//! per step through the `Transport`, waits for it, and only then touches the
//! cache: nothing is shown that the backend has not confirmed. `&mut self` on
//! every action means a second action cannot start while one is in flight.
//!
//! Transitions:
//! - `LoggedOut` -> `Loading` on a successful login.
//! - `Loading` -> `Ready` once profile and notes have both loaded.
//! - `Loading` -> `LoggedOut` if either load fails, whatever the cause.
//! - `Ready` -> `LoggedOut` on logout, or when a note request comes back
//!   401/403.

use tracing::{debug, info, warn};

use crate::client::NotesClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::session::SessionStore;
use crate::types::{display_order, Credentials, Note, NoteId, NoteInput, UserProfile};

/// What the user is looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    LoggedOut,
    Loading,
    Ready { profile: UserProfile, notes: Vec<Note> },
}

/// Outcome of a delete that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The user declined the confirmation; no request was sent.
    Cancelled,
}

pub struct NotesController<S, T> {
    client: NotesClient<S>,
    transport: T,
    view: View,
    error: Option<String>,
}

impl<S: SessionStore, T: Transport> NotesController<S, T> {
    /// Starts in `Loading` when a token is already stored; call `load` next.
    pub fn new(client: NotesClient<S>, transport: T) -> Self {
        let view = if client.is_authenticated() {
            View::Loading
        } else {
            View::LoggedOut
        };
        Self {
            client,
            transport,
            view,
            error: None,
        }
    }

    pub fn client(&self) -> &NotesClient<S> {
        &self.client
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.view, View::Ready { .. })
    }

    /// Last user-visible error, cleared when the next action starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.view {
            View::Ready { profile, .. } => Some(profile),
            _ => None,
        }
    }

    /// Cached notes in cache order, which carries no meaning.
    pub fn notes(&self) -> &[Note] {
        match &self.view {
            View::Ready { notes, .. } => notes,
            _ => &[],
        }
    }

    pub fn ordered_notes(&self) -> Vec<&Note> {
        display_order(self.notes())
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes().iter().find(|note| &note.id == id)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Log in, then load the profile and notes.
    pub fn login(&mut self, credentials: Credentials) -> Result<(), ApiError> {
        self.error = None;
        let result = credentials.validated().and_then(|credentials| {
            let request = self.client.build_login(&credentials)?;
            let response = self.send(request)?;
            self.client.parse_login(response)
        });
        match result {
            Ok(_) => {
                info!("login accepted");
                self.view = View::Loading;
                self.load()
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.view = View::LoggedOut;
                self.error = Some(message_or(&err, "Login failed"));
                Err(err)
            }
        }
    }

    /// Fetch the profile, then the notes. Any failure lands in `LoggedOut`.
    ///
    /// A 401/403 also drops the stored token. Other failures keep it so the
    /// next start can try again, and leave a message explaining the logout.
    pub fn load(&mut self) -> Result<(), ApiError> {
        self.view = View::Loading;
        let result = self.fetch_profile_and_notes();
        match result {
            Ok((profile, notes)) => {
                info!(email = %profile.email, notes = notes.len(), "session ready");
                self.view = View::Ready { profile, notes };
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.view = View::LoggedOut;
                if err.is_unauthorized() {
                    warn!(error = %err, "session rejected during load");
                    self.client.logout();
                    self.error = None;
                } else {
                    warn!(error = %err, "load failed, returning to login");
                    self.error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    fn fetch_profile_and_notes(&self) -> Result<(UserProfile, Vec<Note>), ApiError> {
        let profile = self.client.parse_profile(self.send(self.client.build_profile())?)?;
        let notes = self.client.parse_list_notes(self.send(self.client.build_list_notes())?)?;
        Ok((profile, notes))
    }

    pub fn logout(&mut self) {
        self.client.logout();
        self.view = View::LoggedOut;
        self.error = None;
        info!("logged out");
    }

    fn ensure_ready(&mut self) -> Result<(), ApiError> {
        if self.is_ready() {
            return Ok(());
        }
        let err = ApiError::NotAuthenticated;
        self.error = Some(err.to_string());
        Err(err)
    }

    /// Record a failed note action. 401/403 ends the session.
    fn fail(&mut self, err: ApiError, fallback: &str) -> ApiError {
        if err.is_unauthorized() {
            warn!(error = %err, "session rejected, returning to login");
            self.client.logout();
            self.view = View::LoggedOut;
        } else {
            warn!(error = %err, "{fallback}");
        }
        self.error = Some(message_or(&err, fallback));
        err
    }

    fn cached_notes_mut(&mut self) -> Option<&mut Vec<Note>> {
        match &mut self.view {
            View::Ready { notes, .. } => Some(notes),
            _ => None,
        }
    }

    /// Create a note; it joins the cache only once the backend returns it.
    pub fn create_note(&mut self, input: NoteInput) -> Result<Note, ApiError> {
        self.error = None;
        self.ensure_ready()?;
        let input = match input.validated() {
            Ok(input) => input,
            Err(err) => return Err(self.fail(err, "Failed to save note")),
        };
        let result = self
            .client
            .build_create_note(&input)
            .and_then(|request| self.send(request))
            .and_then(|response| self.client.parse_create_note(response));
        match result {
            Ok(note) => {
                info!(id = %note.id, "note created");
                if let Some(notes) = self.cached_notes_mut() {
                    notes.insert(0, note.clone());
                }
                Ok(note)
            }
            Err(err) => Err(self.fail(err, "Failed to save note")),
        }
    }

    /// Update a note and replace the cached copy with the backend's version.
    ///
    /// An id the backend does not know fails with a 404 `Request` error.
    pub fn update_note(&mut self, id: &NoteId, input: NoteInput) -> Result<Note, ApiError> {
        self.error = None;
        self.ensure_ready()?;
        let input = match input.validated() {
            Ok(input) => input,
            Err(err) => return Err(self.fail(err, "Failed to save note")),
        };
        let result = self
            .client
            .build_update_note(id, &input)
            .and_then(|request| self.send(request))
            .and_then(|response| self.client.parse_update_note(response));
        match result {
            Ok(note) => {
                info!(%id, "note updated");
                if let Some(cached) = self
                    .cached_notes_mut()
                    .and_then(|notes| notes.iter_mut().find(|n| &n.id == id))
                {
                    *cached = note.clone();
                } else {
                    debug!(%id, "updated note was not cached");
                }
                Ok(note)
            }
            Err(err) => Err(self.fail(err, "Failed to save note")),
        }
    }

    /// Delete a note after `confirm` approves the prompt.
    ///
    /// `confirm` receives `Delete note "<title>"?` and blocks until the user
    /// answers. Declining sends nothing.
    pub fn delete_note<F>(&mut self, id: &NoteId, confirm: F) -> Result<Deletion, ApiError>
    where
        F: FnOnce(&str) -> bool,
    {
        self.error = None;
        self.ensure_ready()?;
        let prompt = match self.note(id) {
            Some(note) => format!("Delete note \"{}\"?", note.title),
            None => format!("Delete note \"{id}\"?"),
        };
        if !confirm(&prompt) {
            debug!(%id, "delete cancelled");
            return Ok(Deletion::Cancelled);
        }
        let result = self
            .send(self.client.build_delete_note(id))
            .and_then(|response| self.client.parse_delete_note(response));
        match result {
            Ok(()) => {
                info!(%id, "note deleted");
                if let Some(notes) = self.cached_notes_mut() {
                    notes.retain(|note| &note.id != id);
                }
                Ok(Deletion::Deleted)
            }
            Err(err) => Err(self.fail(err, "Failed to delete note")),
        }
    }
}

fn message_or(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
