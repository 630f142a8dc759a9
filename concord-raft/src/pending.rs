use std::collections::HashMap;

use concord_raft_types::PeerId;
use uuid::Uuid;

/// What an outstanding correlation id is waiting on. Data, not a closure:
/// a typed record the RESULT handler matches on, so there is no captured
/// state to reason about and no lifetime tied to the registration site.
#[derive(Debug, Clone)]
pub enum PendingKind {
    /// A `RequestVote` broadcast for an election: up to `N-1` peers may
    /// reply under the same correlation id.
    Election {
        /// The term this election was started for; a reply answering a
        /// stale term (the node has since moved on) is a no-op.
        term: u64,
        /// How many `RequestVote` replies have granted the vote so far.
        votes_granted: usize,
    },
    /// A per-peer `AppendEntries` call.
    AppendEntries {
        /// The peer this call was sent to.
        peer: PeerId,
        /// The term this call was sent under.
        term: u64,
    },
}

/// One outstanding outbound call: how many replies are still expected,
/// and what to do with them.
#[derive(Debug, Clone)]
pub struct PendingCall {
    /// The call's purpose and any in-flight tally.
    pub kind: PendingKind,
    /// Replies still expected before this entry is removed.
    pub remaining_calls: usize,
}

/// Maps correlation ids to outstanding calls. Entries are removed once
/// `remaining_calls` reaches zero. A correlation id not found here (an
/// unknown id, or one already deregistered) is not an error — it is
/// disposed of by silent drop.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    calls: HashMap<Uuid, PendingCall>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a call to a single peer (`remainingCalls = 1`).
    pub fn register_single(&mut self, uuid: Uuid, peer: PeerId, term: u64) {
        self.calls.insert(
            uuid,
            PendingCall {
                kind: PendingKind::AppendEntries { peer, term },
                remaining_calls: 1,
            },
        );
    }

    /// Registers a broadcast election call (`remainingCalls = N-1`).
    pub fn register_election(&mut self, uuid: Uuid, term: u64, remaining_calls: usize) {
        self.calls.insert(
            uuid,
            PendingCall {
                kind: PendingKind::Election {
                    term,
                    votes_granted: 0,
                },
                remaining_calls,
            },
        );
    }

    /// Looks up `uuid` without consuming it.
    pub fn peek(&self, uuid: &Uuid) -> Option<&PendingCall> {
        self.calls.get(uuid)
    }

    /// Mutable access, for incrementing a vote tally in place.
    pub fn get_mut(&mut self, uuid: &Uuid) -> Option<&mut PendingCall> {
        self.calls.get_mut(uuid)
    }

    /// Records one reply against `uuid`, deregistering it once
    /// `remaining_calls` reaches zero. Returns `false` if `uuid` was not
    /// registered (an unknown correlation id, dropped silently).
    pub fn record_reply(&mut self, uuid: &Uuid) -> bool {
        let Some(call) = self.calls.get_mut(uuid) else {
            return false;
        };
        call.remaining_calls = call.remaining_calls.saturating_sub(1);
        if call.remaining_calls == 0 {
            self.calls.remove(uuid);
        }
        true
    }

    /// Drops every entry. Pending calls are *not* cancelled on role change,
    /// so this is only called where a fresh round explicitly supersedes the
    /// previous one (e.g. a new election starting).
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_call_deregisters_after_one_reply() {
        let mut registry = PendingRegistry::new();
        let uuid = Uuid::new_v4();
        registry.register_single(uuid, PeerId(1), 1);
        assert!(registry.record_reply(&uuid));
        assert!(registry.peek(&uuid).is_none());
    }

    #[test]
    fn election_call_needs_all_replies_before_deregistering() {
        let mut registry = PendingRegistry::new();
        let uuid = Uuid::new_v4();
        registry.register_election(uuid, 1, 2);
        assert!(registry.record_reply(&uuid));
        assert!(registry.peek(&uuid).is_some());
        assert!(registry.record_reply(&uuid));
        assert!(registry.peek(&uuid).is_none());
    }

    #[test]
    fn unknown_uuid_is_dropped_silently() {
        let mut registry = PendingRegistry::new();
        assert!(!registry.record_reply(&Uuid::new_v4()));
    }
}
