//! Runtime configuration for the `notes` binary.
//!
//! Values come from the environment; a `.env` file in the working directory
//! is read first outside of tests. Command-line flags override both.

use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL_VAR: &str = "NOTES_API_BASE_URL";
pub const SESSION_DIR_VAR: &str = "NOTES_SESSION_DIR";
pub const TIMEOUT_VAR: &str = "NOTES_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("could not determine a data directory; set {SESSION_DIR_VAR}")]
    NoDataDir,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Empty means requests go out with relative paths.
    pub api_base_url: String,
    /// Directory holding the persisted session token.
    pub session_dir: PathBuf,
    /// Upper bound on a single request, connect to last body byte.
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup(BASE_URL_VAR).unwrap_or_default().trim().to_string();

        let session_dir = match lookup(SESSION_DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("notes-cli"),
        };

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        TIMEOUT_VAR.to_string(),
                        format!("'{raw}' is not a whole number of seconds"),
                    )
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        TIMEOUT_VAR.to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url,
            session_dir,
            timeout,
        })
    }

    pub fn with_overrides(mut self, api_base_url: Option<String>, session_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(dir) = session_dir {
            self.session_dir = dir;
        }
        self
    }
}
