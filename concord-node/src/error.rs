/// Errors surfaced while wiring a node together.
///
/// As with [`concord_raft::RaftError`] and [`concord_dkg::DkgError`],
/// nothing here is a live-protocol failure; this crate's own errors are
/// startup-time configuration problems that abort the process before the
/// core begins.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Propagated from [`concord_raft::RaftNode::new`].
    #[error(transparent)]
    Raft(#[from] concord_raft::RaftError),
}
