use concord_raft_types::PeerId;

use crate::log::Log;

/// Persistent and volatile Raft state shared across every role. Survives
/// role transitions unchanged; only [`crate::role::Role`] is replaced on a
/// transition.
pub struct RaftContext {
    /// This node's id.
    pub self_id: PeerId,
    /// Every other peer's id.
    pub peers: Vec<PeerId>,
    /// Quorum size for `peers.len() + 1` total nodes.
    pub quorum: usize,

    // --- persistent ---
    /// Latest term this node has seen.
    pub current_term: u64,
    /// Candidate this node voted for in `current_term`, if any.
    pub voted_for: Option<PeerId>,
    /// The replicated log.
    pub log: Log,

    // --- volatile ---
    /// Highest log index known committed.
    pub commit_index: u64,
    /// Highest log index applied to the client sink.
    pub last_applied: u64,
    /// Who this node currently believes is leader.
    pub leader_id: Option<PeerId>,
    /// Set when an RPC preamble observes a higher term; consulted (and
    /// cleared) at the end of every lock-holding operation, not only on
    /// the next `tick()`.
    pub should_become_follower: bool,
}

impl RaftContext {
    pub fn new(self_id: PeerId, peers: Vec<PeerId>) -> Self {
        let quorum = crate::role::quorum(peers.len() + 1);
        Self {
            self_id,
            peers,
            quorum,
            current_term: 0,
            voted_for: None,
            log: Log::new(),
            commit_index: 0,
            last_applied: 0,
            leader_id: None,
            should_become_follower: false,
        }
    }

    /// The shared RPC preamble: observes `args.term` against
    /// `current_term`, bumping term/clearing vote/arming
    /// `should_become_follower` as needed. Returns `true` if the caller
    /// should reply with an immediate stale-term failure rather than
    /// processing the call further.
    pub fn observe_term(&mut self, term: u64) -> bool {
        if term < self.current_term {
            return true;
        }
        if term > self.current_term {
            self.current_term = term;
            self.voted_for = None;
            self.should_become_follower = true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_term_bumps_state_and_arms_follower_flag() {
        let mut ctx = RaftContext::new(PeerId(0), vec![PeerId(1), PeerId(2)]);
        ctx.current_term = 3;
        ctx.voted_for = Some(PeerId(1));
        let stale = ctx.observe_term(5);
        assert!(!stale);
        assert_eq!(ctx.current_term, 5);
        assert_eq!(ctx.voted_for, None);
        assert!(ctx.should_become_follower);
    }

    #[test]
    fn lower_term_is_flagged_stale() {
        let mut ctx = RaftContext::new(PeerId(0), vec![PeerId(1), PeerId(2)]);
        ctx.current_term = 5;
        assert!(ctx.observe_term(3));
        assert_eq!(ctx.current_term, 5);
    }

    #[test]
    fn quorum_is_majority_of_total_peer_count() {
        let ctx = RaftContext::new(PeerId(0), vec![PeerId(1), PeerId(2)]);
        assert_eq!(ctx.quorum, 2);
    }
}
