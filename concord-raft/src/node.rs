use std::sync::Arc;
use std::time::Instant;

use concord_raft_types::{
    AppendEntriesArgs, AppendEntriesResult, LogEntry, PeerId, RaftMessage, RequestVoteArgs,
    RequestVoteResult, RpcResult,
};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::context::RaftContext;
use crate::error::RaftError;
use crate::pending::{PendingKind, PendingRegistry};
use crate::role::Role;
use crate::timing::TimingConfig;
use crate::traits::{ClientSink, Transport};

struct Inner {
    ctx: RaftContext,
    role: Role,
    pending: PendingRegistry,
}

/// A single node's Raft state machine.
///
/// Owns one lock covering all persistent+volatile state, the current
/// role, and the pending-RPC registry. Every RPC handler, `tick`, and
/// role transition runs under this lock;
/// the only work done while holding it is mutating state and enqueuing to
/// `transport` (fire-and-forget, never blocking).
pub struct RaftNode {
    inner: Mutex<Inner>,
    timing: TimingConfig,
    transport: Arc<dyn Transport>,
    client_sink: Arc<dyn ClientSink>,
}

impl RaftNode {
    /// Builds a node starting as a fresh Follower.
    pub fn new(
        self_id: PeerId,
        peers: Vec<PeerId>,
        timing: TimingConfig,
        transport: Arc<dyn Transport>,
        client_sink: Arc<dyn ClientSink>,
    ) -> Result<Self, RaftError> {
        timing.validate()?;
        if peers.is_empty() {
            return Err(RaftError::NoPeers);
        }
        let ctx = RaftContext::new(self_id, peers);
        let deadline = Instant::now() + timing.random_election_timeout(&mut rand::thread_rng());
        Ok(Self {
            inner: Mutex::new(Inner {
                ctx,
                role: Role::follower(deadline),
                pending: PendingRegistry::new(),
            }),
            timing,
            transport,
            client_sink,
        })
    }

    /// This node's id.
    pub fn self_id(&self) -> PeerId {
        self.inner.lock().ctx.self_id
    }

    /// Whether this node currently believes itself to be leader.
    pub fn is_leader(&self) -> bool {
        self.inner.lock().role.is_leader()
    }

    /// The current term, for tests and observability.
    pub fn current_term(&self) -> u64 {
        self.inner.lock().ctx.current_term
    }

    /// `commitIndex`, for tests and observability.
    pub fn commit_index(&self) -> u64 {
        self.inner.lock().ctx.commit_index
    }

    // -- inbound dispatch --------------------------------------------------

    /// Handles one inbound [`RaftMessage`] from `src`.
    pub fn handle_message(&self, msg: RaftMessage, src: PeerId) {
        let mut inner = self.inner.lock();
        match msg {
            RaftMessage::AppendEntries { uuid, args } => {
                let result = self.handle_append_entries(&mut inner, args);
                self.apply_pending_role_change(&mut inner);
                self.transport.send(
                    &RaftMessage::Result {
                        uuid,
                        result: RpcResult::AppendEntries(result),
                    }
                    .encode(),
                    src,
                );
            }
            RaftMessage::RequestVote { uuid, args } => {
                let result = self.handle_request_vote(&mut inner, args);
                self.apply_pending_role_change(&mut inner);
                self.transport.send(
                    &RaftMessage::Result {
                        uuid,
                        result: RpcResult::RequestVote(result),
                    }
                    .encode(),
                    src,
                );
            }
            RaftMessage::Result { uuid, result } => {
                self.handle_result(&mut inner, uuid, result, src);
                self.apply_pending_role_change(&mut inner);
            }
            RaftMessage::ClientEntry { uuid: _, payload } => {
                self.submit_locked(&mut inner, payload);
            }
        }
    }

    fn handle_append_entries(
        &self,
        inner: &mut Inner,
        args: AppendEntriesArgs,
    ) -> AppendEntriesResult {
        let stale = inner.ctx.observe_term(args.term);
        if stale {
            return AppendEntriesResult {
                term: inner.ctx.current_term,
                success: false,
                last_log_index: inner.ctx.log.last_log_index(),
            };
        }
        // A Candidate hearing from a legitimate same-or-higher-term leader
        // steps down, even without a term bump.
        if matches!(inner.role, Role::Candidate { .. }) {
            inner.ctx.should_become_follower = true;
        }
        inner.ctx.leader_id = Some(args.leader_id);
        self.reset_election_timer(inner);

        if !inner.ctx.log.matches(args.prev_log_index, args.prev_log_term) {
            return AppendEntriesResult {
                term: inner.ctx.current_term,
                success: false,
                last_log_index: inner.ctx.log.last_log_index(),
            };
        }
        for entry in args.entries {
            inner.ctx.log.insert(entry);
        }
        if args.leader_commit > inner.ctx.commit_index {
            inner.ctx.commit_index = args.leader_commit.min(inner.ctx.log.last_log_index());
        }
        AppendEntriesResult {
            term: inner.ctx.current_term,
            success: true,
            last_log_index: inner.ctx.log.last_log_index(),
        }
    }

    fn handle_request_vote(
        &self,
        inner: &mut Inner,
        args: RequestVoteArgs,
    ) -> RequestVoteResult {
        let stale = inner.ctx.observe_term(args.term);
        if stale {
            return RequestVoteResult {
                term: inner.ctx.current_term,
                vote_granted: false,
                last_log_index: inner.ctx.log.last_log_index(),
            };
        }
        // Standard lexicographic (lastLogTerm, lastLogIndex) freshness
        // check, the safe rule rather than an index-only comparison.
        let candidate_is_fresh = (args.last_log_term, args.last_log_index)
            >= (inner.ctx.log.last_log_term(), inner.ctx.log.last_log_index());
        let can_vote = inner.ctx.voted_for.is_none()
            || inner.ctx.voted_for == Some(args.candidate_id);
        let grant = can_vote && candidate_is_fresh;
        if grant {
            inner.ctx.voted_for = Some(args.candidate_id);
            self.reset_election_timer(inner);
        }
        RequestVoteResult {
            term: inner.ctx.current_term,
            vote_granted: grant,
            last_log_index: inner.ctx.log.last_log_index(),
        }
    }

    fn handle_result(&self, inner: &mut Inner, uuid: Uuid, result: RpcResult, _src: PeerId) {
        match result {
            RpcResult::AppendEntries(r) => {
                inner.ctx.observe_term(r.term);
                let Some(call) = inner.pending.peek(&uuid).cloned() else {
                    return;
                };
                if let PendingKind::AppendEntries { peer, term } = call.kind {
                    if term == inner.ctx.current_term {
                        if let Role::Leader {
                            next_index,
                            match_index,
                            ..
                        } = &mut inner.role
                        {
                            if r.success {
                                match_index.insert(peer, r.last_log_index);
                                next_index.insert(peer, r.last_log_index + 1);
                            } else if let Some(idx) = next_index.get_mut(&peer) {
                                *idx = (*idx - 1).max(1);
                            }
                        }
                    }
                }
                self.try_advance_commit(inner);
                inner.pending.record_reply(&uuid);
            }
            RpcResult::RequestVote(r) => {
                inner.ctx.observe_term(r.term);
                let mut votes_granted = None;
                if r.vote_granted {
                    if let Some(call) = inner.pending.get_mut(&uuid) {
                        if let PendingKind::Election { term, votes_granted: v } = &mut call.kind {
                            if *term == inner.ctx.current_term {
                                *v += 1;
                                votes_granted = Some(*v);
                            }
                        }
                    }
                }
                inner.pending.record_reply(&uuid);
                if let Some(votes_granted) = votes_granted {
                    if matches!(inner.role, Role::Candidate { .. })
                        && votes_granted + 1 >= inner.ctx.quorum
                    {
                        self.promote_to_leader(inner);
                    }
                }
            }
        }
    }

    /// Promotes to Leader immediately once quorum is reached, rather than
    /// waiting for the next `tick()`: promotion and the first heartbeat
    /// happen in the same logical step as the deciding vote.
    fn promote_to_leader(&self, inner: &mut Inner) {
        tracing::info!(term = inner.ctx.current_term, "won election, becoming leader");
        inner.role = Role::leader(&inner.ctx.peers, inner.ctx.log.last_log_index(), Instant::now());
        inner.ctx.leader_id = Some(inner.ctx.self_id);
        self.broadcast_heartbeat(inner);
    }

    // -- tick ----------------------------------------------------------

    /// Drives timeouts and leader replication. Must be called periodically
    /// by a dedicated tick thread.
    pub fn tick(&self) {
        let mut inner = self.inner.lock();
        self.apply_pending_role_change(&mut inner);

        enum Due {
            Election,
            Heartbeat,
        }
        let now = Instant::now();
        let due = match &inner.role {
            Role::Follower { election_deadline } if now >= *election_deadline => {
                Some(Due::Election)
            }
            Role::Candidate { election_deadline } if now >= *election_deadline => {
                Some(Due::Election)
            }
            Role::Leader { next_heartbeat, .. } if now >= *next_heartbeat => Some(Due::Heartbeat),
            _ => None,
        };
        match due {
            Some(Due::Election) => self.start_election(&mut inner),
            Some(Due::Heartbeat) => {
                self.broadcast_heartbeat(&mut inner);
                if let Role::Leader { next_heartbeat, .. } = &mut inner.role {
                    *next_heartbeat = now + self.timing.heartbeat_interval;
                }
            }
            None => {}
        }

        self.apply_committed_entries(&mut inner);
    }

    fn reset_election_timer(&self, inner: &mut Inner) {
        let deadline =
            Instant::now() + self.timing.random_election_timeout(&mut rand::thread_rng());
        match &mut inner.role {
            Role::Follower { election_deadline } => *election_deadline = deadline,
            Role::Candidate { election_deadline } => *election_deadline = deadline,
            Role::Leader { .. } => {}
        }
    }

    fn apply_pending_role_change(&self, inner: &mut Inner) {
        if !inner.ctx.should_become_follower {
            return;
        }
        inner.ctx.should_become_follower = false;
        if matches!(inner.role, Role::Follower { .. }) {
            return;
        }
        tracing::debug!(term = inner.ctx.current_term, "stepping down to follower");
        let deadline =
            Instant::now() + self.timing.random_election_timeout(&mut rand::thread_rng());
        inner.role = Role::follower(deadline);
    }

    fn start_election(&self, inner: &mut Inner) {
        inner.ctx.current_term += 1;
        inner.ctx.voted_for = Some(inner.ctx.self_id);
        let term = inner.ctx.current_term;
        let deadline =
            Instant::now() + self.timing.random_election_timeout(&mut rand::thread_rng());
        inner.role = Role::candidate(deadline);

        let uuid = Uuid::new_v4();
        inner
            .pending
            .register_election(uuid, term, inner.ctx.peers.len());
        tracing::info!(term, candidate = %inner.ctx.self_id, "starting election");
        let args = RequestVoteArgs {
            term,
            candidate_id: inner.ctx.self_id,
            last_log_index: inner.ctx.log.last_log_index(),
            last_log_term: inner.ctx.log.last_log_term(),
        };
        self.transport
            .broadcast(&RaftMessage::RequestVote { uuid, args }.encode());
    }

    fn broadcast_heartbeat(&self, inner: &mut Inner) {
        let peers = inner.ctx.peers.clone();
        for peer in peers {
            self.replicate_to_peer(inner, peer);
        }
    }

    fn replicate_to_peer(&self, inner: &mut Inner, peer: PeerId) {
        let Role::Leader { next_index, .. } = &inner.role else {
            return;
        };
        let next = *next_index.get(&peer).unwrap_or(&1);
        let prev_log_index = next.saturating_sub(1);
        let prev_log_term = if prev_log_index == 0 {
            0
        } else {
            inner.ctx.log.term_at(prev_log_index).unwrap_or(0)
        };
        let entries: Vec<LogEntry> = (next..=inner.ctx.log.last_log_index())
            .filter_map(|i| inner.ctx.log.get(i).cloned())
            .collect();

        let uuid = Uuid::new_v4();
        let term = inner.ctx.current_term;
        inner.pending.register_single(uuid, peer, term);
        let args = AppendEntriesArgs {
            term,
            leader_id: inner.ctx.self_id,
            prev_log_index,
            prev_log_term,
            entries,
            leader_commit: inner.ctx.commit_index,
        };
        self.transport
            .send(&RaftMessage::AppendEntries { uuid, args }.encode(), peer);
    }

    /// Advances `commitIndex` to the highest index replicated on a quorum
    /// under the current term, the leader-completeness guard against
    /// committing an entry from a previous term via simple replication
    /// count alone.
    fn try_advance_commit(&self, inner: &mut Inner) {
        let Role::Leader { match_index, .. } = &inner.role else {
            return;
        };
        let current_term = inner.ctx.current_term;
        let quorum = inner.ctx.quorum;
        let last_log_index = inner.ctx.log.last_log_index();
        let mut candidate = inner.ctx.commit_index;
        for n in ((inner.ctx.commit_index + 1)..=last_log_index).rev() {
            if inner.ctx.log.term_at(n) != Some(current_term) {
                continue;
            }
            // self always counts as replicated at last_log_index.
            let replicated = 1 + match_index.values().filter(|&&m| m >= n).count();
            if replicated >= quorum {
                candidate = n;
                break;
            }
        }
        if candidate > inner.ctx.commit_index {
            inner.ctx.commit_index = candidate;
        }
    }

    fn apply_committed_entries(&self, inner: &mut Inner) {
        while inner.ctx.last_applied < inner.ctx.commit_index {
            inner.ctx.last_applied += 1;
            if let Some(payload) = inner.ctx.log.payload_at(inner.ctx.last_applied) {
                self.client_sink.deliver(payload);
            }
        }
    }

    // -- client entry submission ----------------------------------------

    /// Accepted on any role. Leaders append directly; followers forward
    /// to the believed leader.
    pub fn submit(&self, payload: Vec<u8>) {
        let mut inner = self.inner.lock();
        self.submit_locked(&mut inner, payload);
    }

    fn submit_locked(&self, inner: &mut Inner, payload: Vec<u8>) {
        if inner.role.is_leader() {
            let term = inner.ctx.current_term;
            inner.ctx.log.append_new(term, payload);
            return;
        }
        let Some(leader_id) = inner.ctx.leader_id else {
            tracing::debug!("no known leader yet, dropping client entry");
            return;
        };
        self.transport.send(
            &RaftMessage::ClientEntry {
                uuid: Uuid::new_v4(),
                payload,
            }
            .encode(),
            leader_id,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: StdMutex<Vec<(Vec<u8>, PeerId)>>,
        broadcast: StdMutex<Vec<Vec<u8>>>,
    }

    impl Transport for RecordingTransport {
        fn send(&self, payload: &[u8], dest: PeerId) {
            self.sent.lock().unwrap().push((payload.to_vec(), dest));
        }
        fn broadcast(&self, payload: &[u8]) {
            self.broadcast.lock().unwrap().push(payload.to_vec());
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: StdMutex<Vec<Vec<u8>>>,
    }

    impl ClientSink for RecordingSink {
        fn deliver(&self, payload: &[u8]) {
            self.delivered.lock().unwrap().push(payload.to_vec());
        }
    }

    fn node(self_id: u16, peers: &[u16]) -> (Arc<RaftNode>, Arc<RecordingTransport>, Arc<RecordingSink>) {
        let transport = Arc::new(RecordingTransport::default());
        let sink = Arc::new(RecordingSink::default());
        let node = RaftNode::new(
            PeerId(self_id),
            peers.iter().map(|p| PeerId(*p)).collect(),
            TimingConfig::default(),
            transport.clone(),
            sink.clone(),
        )
        .unwrap();
        (Arc::new(node), transport, sink)
    }

    #[test]
    fn stale_term_append_entries_is_rejected_without_state_change() {
        let (node, _transport, _sink) = node(0, &[1, 2]);
        {
            let mut inner = node.inner.lock();
            inner.ctx.current_term = 5;
        }
        let result = {
            let mut inner = node.inner.lock();
            node.handle_append_entries(
                &mut inner,
                AppendEntriesArgs {
                    term: 3,
                    leader_id: PeerId(1),
                    prev_log_index: 0,
                    prev_log_term: 0,
                    entries: vec![],
                    leader_commit: 0,
                },
            )
        };
        assert!(!result.success);
        assert_eq!(result.term, 5);
        assert_eq!(node.current_term(), 5);
    }

    #[test]
    fn log_truncation_on_conflicting_entry() {
        let (node, _transport, _sink) = node(0, &[1, 2]);
        {
            let mut inner = node.inner.lock();
            inner.ctx.log.insert(LogEntry { index: 1, term: 1, payload: b"a".to_vec() });
            inner.ctx.log.insert(LogEntry { index: 2, term: 1, payload: b"b".to_vec() });
            inner.ctx.log.insert(LogEntry { index: 3, term: 1, payload: b"c".to_vec() });
        }
        let result = {
            let mut inner = node.inner.lock();
            node.handle_append_entries(
                &mut inner,
                AppendEntriesArgs {
                    term: 2,
                    leader_id: PeerId(1),
                    prev_log_index: 1,
                    prev_log_term: 1,
                    entries: vec![LogEntry { index: 2, term: 2, payload: b"x".to_vec() }],
                    leader_commit: 0,
                },
            )
        };
        assert!(result.success);
        let inner = node.inner.lock();
        assert!(inner.ctx.log.get(3).is_none());
        assert_eq!(inner.ctx.log.last_log_term(), 2);
    }

    #[test]
    fn request_vote_rejects_candidate_with_stale_log() {
        let (node, _transport, _sink) = node(0, &[1, 2]);
        {
            let mut inner = node.inner.lock();
            inner.ctx.log.insert(LogEntry { index: 1, term: 2, payload: b"a".to_vec() });
        }
        let result = {
            let mut inner = node.inner.lock();
            node.handle_request_vote(
                &mut inner,
                RequestVoteArgs {
                    term: 2,
                    candidate_id: PeerId(1),
                    last_log_index: 0,
                    last_log_term: 0,
                },
            )
        };
        assert!(!result.vote_granted);
    }

    #[test]
    fn granted_vote_is_not_rescinded_within_term() {
        let (node, _transport, _sink) = node(0, &[1, 2]);
        let r1 = {
            let mut inner = node.inner.lock();
            node.handle_request_vote(
                &mut inner,
                RequestVoteArgs { term: 1, candidate_id: PeerId(1), last_log_index: 0, last_log_term: 0 },
            )
        };
        assert!(r1.vote_granted);
        let r2 = {
            let mut inner = node.inner.lock();
            node.handle_request_vote(
                &mut inner,
                RequestVoteArgs { term: 1, candidate_id: PeerId(2), last_log_index: 0, last_log_term: 0 },
            )
        };
        assert!(!r2.vote_granted);
    }

    #[test]
    fn submit_on_leader_appends_without_forwarding() {
        let (node, transport, _sink) = node(0, &[1, 2]);
        {
            let mut inner = node.inner.lock();
            inner.role = Role::leader(&inner.ctx.peers.clone(), 0, Instant::now());
        }
        node.submit(b"hello".to_vec());
        assert_eq!(node.inner.lock().ctx.log.last_log_index(), 1);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn submit_on_follower_forwards_to_leader() {
        let (node, transport, _sink) = node(0, &[1, 2]);
        {
            let mut inner = node.inner.lock();
            inner.ctx.leader_id = Some(PeerId(1));
        }
        node.submit(b"hello".to_vec());
        assert_eq!(node.inner.lock().ctx.log.last_log_index(), 0);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
