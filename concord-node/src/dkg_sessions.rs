//! Tracks the DKG sessions currently running on this node.
//!
//! An `Arc<Mutex<_>>`-wrapped map guarding against session-id reuse: the
//! map holds the actual per-session [`DkgCoordinator`] rather than a
//! presence marker, since a session's lifetime spans many inbound
//! messages and the coordinator itself is the thing that needs to be
//! looked up on each one.
use std::collections::HashMap;
use std::sync::Arc;

use concord_dkg::DkgCoordinator;
use parking_lot::Mutex;

/// Concurrent registry of active DKG sessions, keyed by session id.
#[derive(Default, Clone)]
pub struct DkgSessions(Arc<Mutex<HashMap<String, Arc<DkgCoordinator>>>>);

impl DkgSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly started session. Overwrites any previous
    /// coordinator under the same id — session ids have no lifecycle
    /// beyond "scope to one DKG run", so a caller starting a new run
    /// under a reused id is assumed to mean it.
    pub fn insert(&self, coordinator: Arc<DkgCoordinator>) {
        self.0
            .lock()
            .insert(coordinator.session_id().to_string(), coordinator);
    }

    /// Looks up the coordinator for `session_id`, if a session with that
    /// id is currently tracked.
    pub fn get(&self, session_id: &str) -> Option<Arc<DkgCoordinator>> {
        self.0.lock().get(session_id).cloned()
    }

    /// Drops a completed session.
    pub fn remove(&self, session_id: &str) {
        self.0.lock().remove(session_id);
    }
}
