//! Host-side table of installed wallet sessions.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::Arc};
use uuid::Uuid;

use crate::{error::WalletError, session::WalletSession};

/// Opaque identifier of an installed session, baked into the page's provider script.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random (v4 UUID) identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first 8 characters, used to tell sessions apart in logs.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Maps session ids to their sessions.
///
/// Entries are written once at installation and only removed by explicit eviction. The lock is
/// held for the map access alone, never across a dispatch, so calls into different sessions
/// never wait on each other.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<WalletSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` under its own id.
    ///
    /// Returns `false` and leaves the registry untouched if the id is already taken.
    pub fn insert(&self, session: WalletSession) -> bool {
        self.insert_shared(Arc::new(session))
    }

    /// [`Self::insert`] for a session that may also be held elsewhere.
    pub fn insert_shared(&self, session: Arc<WalletSession>) -> bool {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(session.id()) {
            return false;
        }
        sessions.insert(session.id().clone(), session);
        true
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<WalletSession>> {
        self.sessions.read().get(id).cloned()
    }

    /// Same as [`Self::get`] but fails with [`WalletError::SessionNotFound`].
    pub fn lookup(&self, id: &SessionId) -> Result<Arc<WalletSession>, WalletError> {
        self.get(id).ok_or_else(|| WalletError::SessionNotFound(id.clone()))
    }

    /// Evicts a session. Calls already dispatched to it still complete.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<WalletSession>> {
        self.sessions.write().remove(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
