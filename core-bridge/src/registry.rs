//! # Session Registry
//!
//! Tracks live bridge sessions by id and remembers which one is *current*:
//! the most recently attached session that has not been torn down. Hosts that
//! only have a global entry point (for example a static `send_action`) reach
//! the active page through the current slot.
//!
//! The registry holds weak references only. A session that has been dropped
//! or torn down is never kept alive by the registry, and sending through it
//! reports [`Dispatch::NoActiveSession`] instead of touching a dead view.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::{Dispatch, SessionInner};

/// Unique identifier of a bridge session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<SessionId, Weak<SessionInner>>,
    current: Option<SessionId>,
}

#[derive(Default)]
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<SessionRegistry>> = OnceLock::new();

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used when the host does not inject its own.
    pub fn global() -> Arc<SessionRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(SessionRegistry::new())))
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, id: SessionId, session: Weak<SessionInner>) {
        let mut state = self.lock();
        state.sessions.retain(|_, weak| weak.strong_count() > 0);
        state.sessions.insert(id, session);
        debug!(session_id = %id, live = state.sessions.len(), "Registered bridge session");
    }

    /// Marks `id` as the session reached by [`send_action`](Self::send_action).
    pub(crate) fn set_current(&self, id: SessionId) {
        let mut state = self.lock();
        if !state.sessions.contains_key(&id) {
            warn!(session_id = %id, "Ignoring current-session request for unregistered session");
            return;
        }
        state.current = Some(id);
    }

    /// Clears the current slot if it points at `id`.
    pub(crate) fn clear_current(&self, id: SessionId) {
        let mut state = self.lock();
        if state.current == Some(id) {
            state.current = None;
        }
    }

    /// Forgets `id` entirely.
    pub(crate) fn unregister(&self, id: SessionId) {
        let mut state = self.lock();
        state.sessions.remove(&id);
        if state.current == Some(id) {
            state.current = None;
        }
        debug!(session_id = %id, "Unregistered bridge session");
    }

    pub fn current(&self) -> Option<SessionId> {
        self.lock().current
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.lock()
            .sessions
            .get(&id)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    pub fn len(&self) -> usize {
        self.lock()
            .sessions
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn current_session(&self) -> Option<Arc<SessionInner>> {
        let mut state = self.lock();
        let id = state.current?;
        match state.sessions.get(&id).and_then(Weak::upgrade) {
            Some(session) => Some(session),
            None => {
                state.sessions.remove(&id);
                state.current = None;
                None
            }
        }
    }

    /// Posts `{<action>: <value>}` to the current session's page.
    pub fn send_action(&self, action: &str, value: Value) -> Dispatch {
        match self.current_session() {
            Some(session) => session.send_action(action, value),
            None => {
                warn!(action, "No active bridge session; action not sent");
                Dispatch::NoActiveSession
            }
        }
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SessionRegistry")
            .field("sessions", &state.sessions.len())
            .field("current", &state.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_send_without_current_session() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.send_action("pause", json!(true)),
            Dispatch::NoActiveSession
        ));
    }

    #[test]
    fn test_current_requires_registration() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        registry.set_current(id);
        assert_eq!(registry.current(), None);
    }

    #[test]
    fn test_dead_reference_is_pruned() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        registry.register(id, Weak::new());
        registry.set_current(id);
        assert_eq!(registry.current(), Some(id));
        assert!(!registry.contains(id));

        assert!(matches!(
            registry.send_action("pause", json!(true)),
            Dispatch::NoActiveSession
        ));
        assert_eq!(registry.current(), None);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&SessionRegistry::global(), &SessionRegistry::global()));
    }
}
