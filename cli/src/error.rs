//! Top-level error type for the `notes` binary.

use notes_core::ApiError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("not logged in; run `notes login` first")]
    NotLoggedIn,

    #[error("session expired ({0}); run `notes login` again")]
    SessionExpired(ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// 2 when the user has to log in or fix configuration, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) | CliError::NotLoggedIn | CliError::SessionExpired(_) => 2,
            CliError::Api(err) if err.is_unauthorized() => 2,
            _ => 1,
        }
    }
}
