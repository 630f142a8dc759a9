//! An in-process transport that never touches a socket.
//!
//! Every node's outbound call only ever enqueues: the only work done while
//! a node's lock is held is mutating state and enqueuing to transport,
//! never blocking. Delivery is a separate step a test drives explicitly
//! via [`Network::pump`], standing in for the out-of-scope I/O thread that
//! would otherwise dequeue and dispatch concurrently.
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use concord_node::NodeHandle;
use concord_raft::Transport;
use concord_raft_types::PeerId;
use parking_lot::Mutex;

enum Dest {
    Unicast(u16),
    Broadcast,
}

struct Envelope {
    src: u16,
    dest: Dest,
    payload: Vec<u8>,
}

/// Prepends the `"<src_peer_id>:"` prefix a peer-to-peer hop adds on
/// delivery — never on send: the prefix is metadata the transport attaches
/// when handing a message up to the receiving node, not something a
/// sender attaches to its own outbound payload.
fn prefixed(src: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = format!("{src}:").into_bytes();
    out.extend_from_slice(payload);
    out
}

/// One node's handle onto the shared queue. This is the only state a
/// [`Transport`] implementation needs.
pub struct InMemoryTransport {
    self_id: u16,
    queue: Arc<Mutex<VecDeque<Envelope>>>,
}

impl Transport for InMemoryTransport {
    fn send(&self, payload: &[u8], dest: PeerId) {
        self.queue.lock().push_back(Envelope {
            src: self.self_id,
            dest: Dest::Unicast(dest.0),
            payload: payload.to_vec(),
        });
    }

    fn broadcast(&self, payload: &[u8]) {
        self.queue.lock().push_back(Envelope {
            src: self.self_id,
            dest: Dest::Broadcast,
            payload: payload.to_vec(),
        });
    }
}

/// A simulated N-peer network: a shared outbound queue plus the registered
/// node handles that queued envelopes get delivered to on [`Network::pump`].
#[derive(Default)]
pub struct Network {
    queue: Arc<Mutex<VecDeque<Envelope>>>,
    nodes: Mutex<HashMap<u16, Arc<NodeHandle>>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the transport handle `id` should be constructed with, before
    /// its [`NodeHandle`] exists (the transport is a constructor argument).
    pub fn transport_for(&self, id: u16) -> Arc<InMemoryTransport> {
        Arc::new(InMemoryTransport {
            self_id: id,
            queue: self.queue.clone(),
        })
    }

    /// Registers a constructed node so it can receive deliveries.
    pub fn register(&self, id: u16, node: Arc<NodeHandle>) {
        self.nodes.lock().insert(id, node);
    }

    /// Delivers every currently-queued envelope, including ones enqueued as
    /// a side effect of delivering an earlier one (e.g. an RPC reply),
    /// until the queue runs dry. Drop-while-partitioned scenarios are
    /// modeled by a test simply not registering, or deregistering, a node
    /// rather than by this harness dropping messages itself.
    pub fn pump(&self) {
        loop {
            let envelope = self.queue.lock().pop_front();
            let Some(envelope) = envelope else {
                break;
            };
            let nodes = self.nodes.lock();
            match envelope.dest {
                Dest::Unicast(dest) => {
                    if let Some(node) = nodes.get(&dest) {
                        node.handle_inbound(&prefixed(envelope.src, &envelope.payload));
                    }
                }
                Dest::Broadcast => {
                    for (&id, node) in nodes.iter() {
                        if id != envelope.src {
                            node.handle_inbound(&prefixed(envelope.src, &envelope.payload));
                        }
                    }
                }
            }
        }
    }
}
