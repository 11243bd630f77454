//! Terminal host for `notes-core`.
//!
//! Supplies the pieces the core leaves to its host: a ureq `Transport`, a
//! file-backed `SessionStore`, configuration and the command surface.

pub mod commands;
pub mod config;
pub mod error;
pub mod session_store;
pub mod transport;

use std::io::{BufRead, Write};

use notes_core::{NotesClient, NotesController};

pub use commands::{execute, Cli, Command};
pub use config::{Config, ConfigError};
pub use error::CliError;
pub use session_store::FileSessionStore;
pub use transport::UreqTransport;

/// Wire a controller from `config` and run `command` on it.
pub fn run<W: Write, R: BufRead>(command: Command, config: &Config, out: &mut W, input: &mut R) -> Result<(), CliError> {
    let store = FileSessionStore::new(&config.session_dir);
    let client = NotesClient::new(&config.api_base_url, store);
    let mut controller = NotesController::new(client, UreqTransport::new(config.timeout));
    execute(command, &mut controller, out, input)
}
