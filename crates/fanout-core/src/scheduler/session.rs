use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::ActiveClients;

/// Reference-counted registry of running client sessions.
///
/// Clones share the same registry. Two sessions of one client keep it
/// active until both have ended.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `client`. It ends when the guard is dropped.
    pub fn start(&self, client: impl Into<String>) -> Session {
        let client = client.into();
        *self.sessions().entry(client.clone()).or_insert(0) += 1;
        tracing::debug!(client = %client, "session started");
        Session {
            registry: self.clone(),
            client,
        }
    }

    /// End one session of `client`. Ending an unknown client does nothing.
    pub fn end(&self, client: &str) {
        let mut sessions = self.sessions();
        if let Some(count) = sessions.get_mut(client) {
            *count -= 1;
            if *count == 0 {
                sessions.remove(client);
            }
            tracing::debug!(client, "session ended");
        }
    }

    pub fn is_active(&self, client: &str) -> bool {
        self.sessions().contains_key(client)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    // Poison-tolerant: every critical section is a single map update.
    fn sessions(&self) -> MutexGuard<'_, BTreeMap<String, usize>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ActiveClients for SessionRegistry {
    fn active_clients(&self) -> BTreeSet<String> {
        self.sessions().keys().cloned().collect()
    }
}

/// A live client session; dropping it ends the session.
#[derive(Debug)]
pub struct Session {
    registry: SessionRegistry,
    client: String,
}

impl Session {
    pub fn client(&self) -> &str {
        &self.client
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.registry.end(&self.client);
    }
}
