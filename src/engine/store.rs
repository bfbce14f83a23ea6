// In-memory session store with one lock per user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use super::session::Session;
use crate::metrics;

/// Sessions keyed by user id.
///
/// Each user's session sits behind its own async mutex. The guard returned by
/// [`SessionStore::lock`] is held for a whole inbound event, so two updates from
/// the same user are handled one after the other while other users proceed.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<i64, Arc<tokio::sync::Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the session of `user_id`, creating an idle one on first contact.
    pub async fn lock(&self, user_id: i64) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(user_id)
                .or_insert_with(|| {
                    metrics::ACTIVE_SESSIONS.inc();
                    tracing::debug!(user_id, "New session");
                    Arc::new(tokio::sync::Mutex::new(Session::default()))
                })
                .clone()
        };
        slot.lock_owned().await
    }

    /// Number of users with a session.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
