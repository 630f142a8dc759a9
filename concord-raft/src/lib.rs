//! The Raft consensus core: role transitions, log replication, leader
//! election, commit advancement, and client-entry application.
//!
//! [`RaftNode`] owns a single lock over all persistent/volatile state, the
//! current [`Role`], and the [`pending::PendingRegistry`] of outstanding
//! correlated RPCs. It consumes a [`Transport`] and
//! [`ClientSink`] implementation from the outside world and exposes
//! [`RaftNode::handle_message`], [`RaftNode::tick`], and
//! [`RaftNode::submit`] as its only entry points.

mod context;
mod error;
mod log;
mod node;
mod pending;
mod role;
mod timing;
mod traits;

pub use context::RaftContext;
pub use error::RaftError;
pub use log::Log;
pub use node::RaftNode;
pub use pending::{PendingCall, PendingKind, PendingRegistry};
pub use role::{quorum, Role};
pub use timing::TimingConfig;
pub use traits::{ClientSink, Transport};
