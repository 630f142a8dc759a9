use std::sync::Arc;

use concord_raft::ClientSink;
use parking_lot::Mutex;

/// Records every delivered committed entry in order, for test assertions
/// against the commit-order guarantee: called in strictly ascending index
/// order, exactly once per committed entry.
#[derive(Default, Clone)]
pub struct RecordingClientSink(Arc<Mutex<Vec<Vec<u8>>>>);

impl RecordingClientSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Vec<u8>> {
        self.0.lock().clone()
    }
}

impl ClientSink for RecordingClientSink {
    fn deliver(&self, payload: &[u8]) {
        self.0.lock().push(payload.to_vec());
    }
}
