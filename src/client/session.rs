//! Auth Session Store
//!
//! Holds the signed-in identity and its bearer token. The store is an explicit
//! context object: it is cloned into every API client and workflow that needs
//! it, and views subscribe to changes through a `watch` receiver instead of
//! reading ambient global state.
//!
//! Only sign-in, sign-up, sign-out and token invalidation write to the store.
//! Every write is persisted through a [`SessionStorage`] so the session
//! survives restarts.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::shared::error::StorageError;
use crate::shared::user::{Role, SessionIdentity};

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential, persisted under the fixed `auth-token` key
    #[serde(rename = "auth-token")]
    pub token: String,
    pub identity: SessionIdentity,
}

/// Persistence backend for the session.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StorageError>;
    fn save(&self, session: &Session) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file storage.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.slot.lock().map(|s| s.clone()).unwrap_or_default())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

struct SessionInner {
    storage: Box<dyn SessionStorage>,
    state: watch::Sender<Option<Session>>,
}

/// Shared handle to the current session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("identity", &self.identity())
            .finish()
    }
}

impl SessionStore {
    /// Restore whatever the storage holds. A corrupt stored session is
    /// discarded rather than blocking startup.
    pub fn restore(storage: impl SessionStorage + 'static) -> Self {
        let initial = match storage.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session");
                if let Err(e) = storage.clear() {
                    tracing::warn!(error = %e, "could not clear unreadable session");
                }
                None
            }
        };
        if let Some(ref session) = initial {
            tracing::debug!(user = %session.identity.id, role = %session.identity.role, "restored session");
        }
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SessionInner {
                storage: Box::new(storage),
                state,
            }),
        }
    }

    /// A store with no session and nothing persisted.
    pub fn in_memory() -> Self {
        Self::restore(MemorySessionStorage::new())
    }

    /// Store a session and notify subscribers. If persisting fails the
    /// session is kept in memory only and will not survive a restart.
    pub fn sign_in(&self, token: impl Into<String>, identity: SessionIdentity) {
        let session = Session {
            token: token.into(),
            identity,
        };
        if let Err(e) = self.inner.storage.save(&session) {
            tracing::warn!(error = %e, "could not persist session; keeping it in memory only");
        }
        tracing::info!(user = %session.identity.id, role = %session.identity.role, "signed in");
        self.inner.state.send_replace(Some(session));
    }

    pub fn sign_out(&self) -> Result<(), StorageError> {
        tracing::info!("signed out");
        self.inner.state.send_replace(None);
        self.inner.storage.clear()
    }

    /// The backend rejected `token`. Clears the session only while it still
    /// holds that token, so a late 401 for an earlier session is ignored.
    pub fn invalidate(&self, token: &str) {
        let cleared = self
            .inner
            .state
            .send_if_modified(|current| match current {
                Some(session) if session.token == token => {
                    *current = None;
                    true
                }
                _ => false,
            });
        if !cleared {
            tracing::debug!("ignoring rejection of a token that is no longer current");
            return;
        }
        tracing::warn!("session token rejected by the server; clearing session");
        if let Err(e) = self.inner.storage.clear() {
            tracing::warn!(error = %e, "could not clear persisted session");
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.inner.state.borrow().as_ref().map(|s| s.identity.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.inner.state.borrow().as_ref().map(|s| s.identity.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Receiver that is notified on every sign-in, sign-out and invalidation.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.state.subscribe()
    }
}
