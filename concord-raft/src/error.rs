/// Errors surfaced by [`crate::RaftNode`] construction.
///
/// Nothing inside the running core is fatal; the only failure mode this
/// crate exposes is an invalid static configuration, which is a
/// startup-time concern, not a protocol one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RaftError {
    /// The election timeout range was empty or inverted.
    #[error("election timeout min ({min_ms}ms) must be less than max ({max_ms}ms)")]
    InvalidElectionTimeout {
        /// The configured lower bound, in milliseconds.
        min_ms: u64,
        /// The configured upper bound, in milliseconds.
        max_ms: u64,
    },
    /// A node was started with no peers at all.
    #[error("at least one peer is required")]
    NoPeers,
}
