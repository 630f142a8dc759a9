use std::collections::HashMap;
use std::time::Instant;

use concord_raft_types::PeerId;

/// Which role a node is currently playing.
///
/// A tagged variant over role-specific volatile data, not a subclass
/// hierarchy: persistent+volatile state shared across roles
/// (`currentTerm`, the log, `commitIndex`, ...) lives in
/// [`crate::context::RaftContext`] and is untouched by a role transition;
/// only this enum is replaced. That makes "forgot to copy a field forward"
/// bugs structurally impossible.
#[derive(Debug)]
pub enum Role {
    /// Passively responds to RPCs; converts to Candidate on election
    /// timeout.
    Follower {
        /// When the next election timeout fires absent contact from a
        /// leader.
        election_deadline: Instant,
    },
    /// Has started an election for the context's `currentTerm`.
    Candidate {
        /// When this election's timeout re-expires (triggering a fresh
        /// election with a new term), absent a decision.
        election_deadline: Instant,
    },
    /// Replicates entries and sends heartbeats.
    Leader {
        /// Next log index to send to each peer.
        next_index: HashMap<PeerId, u64>,
        /// Highest log index known replicated to each peer.
        match_index: HashMap<PeerId, u64>,
        /// When the next heartbeat round is due.
        next_heartbeat: Instant,
    },
}

impl Role {
    /// A fresh Follower with its election timer armed for `deadline`.
    pub fn follower(election_deadline: Instant) -> Self {
        Role::Follower { election_deadline }
    }

    /// A fresh Candidate with its election timer armed for `deadline`.
    pub fn candidate(election_deadline: Instant) -> Self {
        Role::Candidate { election_deadline }
    }

    /// A fresh Leader: `nextIndex[j] = last_log_index + 1`,
    /// `matchIndex[j] = 0` for every peer.
    pub fn leader(peers: &[PeerId], last_log_index: u64, next_heartbeat: Instant) -> Self {
        let next_index = peers.iter().map(|p| (*p, last_log_index + 1)).collect();
        let match_index = peers.iter().map(|p| (*p, 0)).collect();
        Role::Leader {
            next_index,
            match_index,
            next_heartbeat,
        }
    }

    /// A short tag for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Role::Follower { .. } => "follower",
            Role::Candidate { .. } => "candidate",
            Role::Leader { .. } => "leader",
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, Role::Leader { .. })
    }
}

/// Quorum size for `n` total peers: `⌊n/2⌋ + 1`.
pub fn quorum(n: usize) -> usize {
    n / 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_is_majority_of_total_peers() {
        assert_eq!(quorum(1), 1);
        assert_eq!(quorum(3), 2);
        assert_eq!(quorum(4), 3);
        assert_eq!(quorum(5), 3);
    }

    #[test]
    fn fresh_leader_initializes_next_and_match_index() {
        let peers = [PeerId(1), PeerId(2)];
        let role = Role::leader(&peers, 5, Instant::now());
        match role {
            Role::Leader {
                next_index,
                match_index,
                ..
            } => {
                assert_eq!(next_index[&PeerId(1)], 6);
                assert_eq!(match_index[&PeerId(1)], 0);
            }
            _ => panic!("expected Leader"),
        }
    }
}
