//! Session token storage.
//!
//! The token is the only client state that outlives a process. The client
//! reads and writes it through `SessionStore`, so hosts can back it with a
//! file, a keychain or plain memory.

use std::sync::{Arc, Mutex, PoisonError};

/// Fixed name of the persisted token entry.
pub const SESSION_TOKEN_KEY: &str = "auth_token";

/// Storage for the bearer token issued at login.
///
/// None of the operations can fail from the caller's point of view: a store
/// that hits an I/O error logs it and behaves as if the entry were absent.
/// `set` replaces any prior value whole and `clear` removes it whole.
pub trait SessionStore {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, token: &str) {
        (**self).set(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, token: &str) {
        (**self).set(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store.set(token);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let store = MemorySessionStore::new();
        let view = store.clone();
        store.set("abc");
        assert_eq!(view.get().as_deref(), Some("abc"));
        view.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn set_overwrites() {
        let store = MemorySessionStore::with_token("old");
        store.set("new");
        assert_eq!(store.get().as_deref(), Some("new"));
    }
}
