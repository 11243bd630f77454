//! Subcommands of the `notes` binary.
//!
//! Each invocation builds a fresh `NotesController`. Commands that need the
//! notes first bring the controller from `Loading` to `Ready`; a controller
//! that starts `LoggedOut` means there is no stored token.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notes_core::render::{preview, updated_label};
use notes_core::{
    ApiError, Credentials, Deletion, NoteId, NoteInput, NotesController, SessionStore, Transport, View,
};
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "notes", version, about = "Personal notes from the command line")]
pub struct Cli {
    /// Backend base URL; overrides NOTES_API_BASE_URL.
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Directory for the session token; overrides NOTES_SESSION_DIR.
    #[arg(long, global = true)]
    pub session_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token.
    Logout,
    /// Report whether a session token is stored (no network).
    Status,
    /// Show the signed-in user.
    Whoami,
    /// List notes, most recently updated first.
    List,
    /// Create a note.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Change a note's title and/or content.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

/// Run one command against `controller`.
///
/// `out` receives user-facing output; `input` answers prompts.
pub fn execute<S, T, W, R>(
    command: Command,
    controller: &mut NotesController<S, T>,
    out: &mut W,
    input: &mut R,
) -> Result<(), CliError>
where
    S: SessionStore,
    T: Transport,
    W: Write,
    R: BufRead,
{
    debug!(?command, "running command");
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt(out, input, "Password: ")?,
            };
            controller.login(Credentials::new(email, password))?;
            let name = controller.profile().map(|p| p.display_name()).unwrap_or("User");
            writeln!(out, "Logged in as {name} ({} notes)", controller.notes().len())?;
        }
        Command::Logout => {
            controller.logout();
            writeln!(out, "Logged out.")?;
        }
        Command::Status => {
            if controller.client().is_authenticated() {
                writeln!(out, "Session token stored.")?;
            } else {
                writeln!(out, "Not logged in.")?;
            }
        }
        Command::Whoami => {
            ensure_ready(controller)?;
            let name = controller.profile().map(|p| p.display_name()).unwrap_or("User");
            writeln!(out, "{name}")?;
        }
        Command::List => {
            ensure_ready(controller)?;
            print_notes(controller, out)?;
        }
        Command::Create { title, content } => {
            ensure_ready(controller)?;
            let note = controller.create_note(NoteInput::new(title, content))?;
            writeln!(out, "Created note {} \"{}\"", note.id, note.title)?;
        }
        Command::Edit { id, title, content } => {
            ensure_ready(controller)?;
            let id = resolve_id(controller, &id);
            let cached = controller.note(&id);
            // Ready means the cache mirrors the backend.
            if cached.is_none() && title.is_none() {
                return Err(missing_note(&id));
            }
            let input = NoteInput::new(
                title.or_else(|| cached.map(|n| n.title.clone())).unwrap_or_default(),
                content.or_else(|| cached.map(|n| n.content.clone())).unwrap_or_default(),
            );
            let note = controller.update_note(&id, input).map_err(|err| not_found(err, &id))?;
            writeln!(out, "Updated note {} \"{}\"", note.id, note.title)?;
        }
        Command::Delete { id, yes } => {
            ensure_ready(controller)?;
            let id = resolve_id(controller, &id);
            let outcome = controller
                .delete_note(&id, |question| yes || confirm(out, input, question))
                .map_err(|err| not_found(err, &id))?;
            match outcome {
                Deletion::Deleted => writeln!(out, "Deleted note {id}.")?,
                Deletion::Cancelled => writeln!(out, "Cancelled.")?,
            }
        }
    }
    Ok(())
}

/// Bring a `Loading` controller to `Ready`.
fn ensure_ready<S: SessionStore, T: Transport>(controller: &mut NotesController<S, T>) -> Result<(), CliError> {
    match controller.view() {
        View::Ready { .. } => Ok(()),
        View::LoggedOut => Err(CliError::NotLoggedIn),
        View::Loading => controller.load().map_err(|err| {
            if err.is_unauthorized() {
                CliError::SessionExpired(err)
            } else {
                CliError::Api(err)
            }
        }),
    }
}

/// Match the argument against cached ids first, so `7` finds an integer id
/// and `abc` a string one.
fn resolve_id<S: SessionStore, T: Transport>(controller: &NotesController<S, T>, raw: &str) -> NoteId {
    controller
        .notes()
        .iter()
        .find(|note| note.id.to_string() == raw)
        .map(|note| note.id.clone())
        .unwrap_or_else(|| match raw.parse::<i64>() {
            Ok(n) => NoteId::Int(n),
            Err(_) => NoteId::from(raw),
        })
}

fn not_found(err: ApiError, id: &NoteId) -> CliError {
    if err.is_not_found() {
        missing_note(id)
    } else {
        CliError::Api(err)
    }
}

fn missing_note(id: &NoteId) -> CliError {
    CliError::Api(ApiError::Request {
        status: 404,
        message: format!("note {id} not found"),
    })
}

fn print_notes<S: SessionStore, T: Transport, W: Write>(
    controller: &NotesController<S, T>,
    out: &mut W,
) -> Result<(), CliError> {
    let notes = controller.ordered_notes();
    if notes.is_empty() {
        writeln!(out, "No notes yet. Create your first note to get started.")?;
        return Ok(());
    }
    for note in notes {
        writeln!(out, "[{}] {}", note.id, note.title)?;
        writeln!(out, "    {}", preview(&note.content))?;
        if let Some(label) = updated_label(note) {
            writeln!(out, "    {label}")?;
        }
    }
    Ok(())
}

fn prompt<W: Write, R: BufRead>(out: &mut W, input: &mut R, question: &str) -> Result<String, CliError> {
    write!(out, "{question}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Blocking yes/no question; anything but `y`/`yes` is a no.
fn confirm<W: Write, R: BufRead>(out: &mut W, input: &mut R, question: &str) -> bool {
    match prompt(out, input, &format!("{question} [y/N] ")) {
        Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(err) => {
            debug!(error = %err, "confirmation prompt failed");
            false
        }
    }
}
