//! Wires the Raft core ([`concord_raft`]) and the DKG core ([`concord_dkg`])
//! behind one inbound dispatcher.
//!
//! Both cores share the same [`concord_raft::Transport`] capability: the
//! wire format's two codecs are disjoint by `kind`, so one transport,
//! one inbound queue, and one dispatch function
//! ([`dispatch::decode_inbound`]) are enough to route a payload to
//! whichever core understands it.

pub mod config;
mod dispatch;
mod dkg_sessions;
mod error;

use std::sync::Arc;

use concord_dkg::{CryptoMessage, DkgCoordinator, PartyId};
use concord_group::CryptoContext;
use concord_raft::{ClientSink, RaftNode, Transport};
use concord_raft_types::PeerId;
use rand::{CryptoRng, Rng};

pub use config::NodeConfig;
pub use dispatch::{decode_inbound, strip_peer_prefix, InboundMessage};
pub use dkg_sessions::DkgSessions;
pub use error::NodeError;

/// A single running node: its Raft core plus its table of active DKG
/// sessions, sharing one transport.
pub struct NodeHandle {
    /// The Raft consensus core.
    pub raft: Arc<RaftNode>,
    dkg_sessions: DkgSessions,
    crypto_context: Arc<CryptoContext>,
    transport: Arc<dyn Transport>,
    self_id: u16,
}

impl NodeHandle {
    /// Builds a node from `config`, assuming peer ids `0..config.peers.len()`
    /// with `config.id` excluded from the Raft peer set.
    pub fn new(
        config: &NodeConfig,
        crypto_context: Arc<CryptoContext>,
        transport: Arc<dyn Transport>,
        client_sink: Arc<dyn ClientSink>,
    ) -> Result<Self, NodeError> {
        let raft_peers = (0..config.peers.len() as u16)
            .filter(|&i| i != config.id)
            .map(PeerId)
            .collect();
        let raft = RaftNode::new(
            PeerId(config.id),
            raft_peers,
            config.timing(),
            transport.clone(),
            client_sink,
        )?;
        Ok(Self {
            raft: Arc::new(raft),
            dkg_sessions: DkgSessions::new(),
            crypto_context,
            transport,
            self_id: config.id,
        })
    }

    /// Starts a new DKG session, registers it, and broadcasts this node's
    /// commit-round message.
    pub fn start_dkg_session<R: Rng + CryptoRng>(
        &self,
        session_id: impl Into<String>,
        n: usize,
        rng: &mut R,
    ) -> Arc<DkgCoordinator> {
        let coordinator = Arc::new(DkgCoordinator::new(
            session_id,
            PartyId(self.self_id),
            n,
            &self.crypto_context,
            rng,
        ));
        self.dkg_sessions.insert(coordinator.clone());
        self.transport.broadcast(&coordinator.commitment().encode());
        coordinator
    }

    /// Broadcasts this node's open-round message for an already-started
    /// session. Callers are expected to have waited
    /// for all `N` commitments (e.g. via
    /// [`concord_dkg::DkgCoordinator::wait_for_commitments`]) before calling
    /// this; broadcasting early is harmless but pointless, since peers
    /// won't be able to verify the commit/open pair until their own commit
    /// round catches up.
    pub fn publish_dkg_opening(&self, session_id: &str) {
        let Some(coordinator) = self.dkg_sessions.get(session_id) else {
            tracing::warn!(session_id, "cannot publish opening for unknown session");
            return;
        };
        self.transport
            .broadcast(&coordinator.opening(&self.crypto_context).encode());
    }

    /// Looks up a tracked DKG session.
    pub fn dkg_session(&self, session_id: &str) -> Option<Arc<DkgCoordinator>> {
        self.dkg_sessions.get(session_id)
    }

    /// Drops a completed DKG session.
    pub fn finish_dkg_session(&self, session_id: &str) {
        self.dkg_sessions.remove(session_id);
    }

    /// Handles one inbound payload as delivered by the transport, already
    /// carrying the `"<src_peer_id>:"` prefix.
    pub fn handle_inbound(&self, raw: &[u8]) {
        let Some((src, payload)) = strip_peer_prefix(raw) else {
            tracing::warn!("malformed inbound payload: missing peer prefix");
            return;
        };
        match decode_inbound(payload) {
            Some(InboundMessage::Raft(msg)) => self.raft.handle_message(msg, PeerId(src)),
            Some(InboundMessage::Crypto(msg)) => self.handle_crypto(msg),
            None => tracing::warn!(src, "malformed inbound payload, dropping"),
        }
    }

    fn handle_crypto(&self, msg: CryptoMessage) {
        let Some(coordinator) = self.dkg_sessions.get(msg.session_id()) else {
            tracing::debug!(
                session_id = msg.session_id(),
                "crypto message for unknown session, dropping"
            );
            return;
        };
        if let Err(err) = coordinator.ingest(&self.crypto_context, &msg) {
            tracing::warn!(%err, "dropping crypto message");
        }
    }
}
