//! File-backed `SessionStore`.
//!
//! The token lives in a single file named after `SESSION_TOKEN_KEY`. Writes
//! go to a sibling temp file that is then renamed over the entry, so a reader
//! sees either the old token or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use notes_core::{SessionStore, SESSION_TOKEN_KEY};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, token: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        let mut file = open_private(&tmp)?;
        file.write_all(token.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Some(raw.trim().to_string()).filter(|token| !token.is_empty()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read session token");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        match self.write(token) {
            Ok(()) => debug!(path = %self.path.display(), "session token saved"),
            Err(err) => warn!(path = %self.path.display(), error = %err, "could not save session token"),
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "session token removed"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %self.path.display(), error = %err, "could not remove session token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_no_token() {
        let dir = tempdir().unwrap();
        assert_eq!(FileSessionStore::new(dir.path()).get(), None);
    }

    #[test]
    fn set_get_clear() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested"));
        store.set("abc");
        assert_eq!(store.get().as_deref(), Some("abc"));
        assert_eq!(store.path().file_name().unwrap(), SESSION_TOKEN_KEY);

        store.set("def");
        assert_eq!(store.get().as_deref(), Some("def"));
        assert!(!store.path().with_extension("tmp").exists());

        store.clear();
        assert_eq!(store.get(), None);
        store.clear();
    }

    #[test]
    fn survives_a_new_handle() {
        let dir = tempdir().unwrap();
        FileSessionStore::new(dir.path()).set("persisted");
        assert_eq!(FileSessionStore::new(dir.path()).get().as_deref(), Some("persisted"));
    }

    #[test]
    fn whitespace_file_is_no_token() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SESSION_TOKEN_KEY), " \n").unwrap();
        assert_eq!(FileSessionStore::new(dir.path()).get(), None);
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.set("secret");
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
