use concord_raft_types::PeerId;

/// The transport capability the core consumes. Both methods are
/// fire-and-forget: failures are swallowed by the implementation and
/// recovered from by the protocol's own retry timers (heartbeats,
/// re-election), never by this trait's return type.
pub trait Transport: Send + Sync {
    /// Unicast `payload` to `dest`.
    fn send(&self, payload: &[u8], dest: PeerId);
    /// Send `payload` to every peer except self.
    fn broadcast(&self, payload: &[u8]);
}

/// The upward interface that receives committed entries. Called in
/// strictly ascending index order, exactly once per committed entry.
pub trait ClientSink: Send + Sync {
    /// Deliver one committed entry's payload.
    fn deliver(&self, payload: &[u8]);
}
