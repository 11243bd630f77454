//! API client core and session controller for the notes service.
//!
//! # Overview
//! `NotesClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `NotesController`
//! drives it through a host-supplied `Transport` and keeps the
//! logged-out / loading / ready view state plus a write-through cache of the
//! user's notes.
//!
//! # Design
//! - The session token lives behind the `SessionStore` trait; the client is
//!   its only reader and writer.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and every response path is testable from data.
//! - All non-2xx responses funnel through `extract_error_message`, and every
//!   error keeps its HTTP status.
//! - DTOs are defined independently from the mock-server crate; the live
//!   lifecycle test catches schema drift.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod render;
pub mod session;
pub mod types;

pub use client::NotesClient;
pub use controller::{Deletion, NotesController, View};
pub use error::{extract_error_message, ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody, Transport};
pub use session::{MemorySessionStore, SessionStore, SESSION_TOKEN_KEY};
pub use types::{display_order, Credentials, LoginResponse, Note, NoteId, NoteInput, UserProfile};
