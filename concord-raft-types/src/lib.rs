//! Wire types for the Raft RPC layer.
//!
//! These are argument/result records only: no behavior, no locking, no
//! networking. [`concord_raft`] owns the state machine that produces and
//! consumes them. Every payload that rides the wire as an opaque byte
//! string (a client submission, a log entry's payload) is carried here as
//! base64 text inside a self-framed UTF-8 textual envelope, the same
//! convention the crypto message codec uses.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant's stable, small non-negative integer id.
///
/// Kept as its own newtype rather than reusing `concord_dkg::PartyId`: the
/// Raft RPC layer has no reason to depend on the crypto stack, and the two
/// ids happen to coincide only because `concord-node` assigns one peer
/// numbering to both subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(pub u16);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

mod payload_b64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        use base64::Engine as _;
        s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        use base64::Engine as _;
        let s = String::deserialize(d)?;
        base64::engine::general_purpose::STANDARD
            .decode(&s)
            .map_err(serde::de::Error::custom)
    }
}

/// A single entry in the replicated log.
///
/// `index` is 1-based; entries are stored keyed by index, not by position
/// in a contiguous vector, since `concord_raft`'s log may receive entries
/// out of order during replication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based position in the log.
    pub index: u64,
    /// The term the leader was in when this entry was appended.
    pub term: u64,
    /// Opaque client payload.
    #[serde(with = "payload_b64")]
    pub payload: Vec<u8>,
}

/// Arguments for an `AppendEntries` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendEntriesArgs {
    /// The leader's term.
    pub term: u64,
    /// The sender, believed to be the leader for `term`.
    pub leader_id: PeerId,
    /// Index immediately preceding `entries`, for the consistency check.
    pub prev_log_index: u64,
    /// Term of the entry at `prev_log_index`.
    pub prev_log_term: u64,
    /// Entries to append, possibly empty (a heartbeat) or out of order.
    pub entries: Vec<LogEntry>,
    /// The leader's `commitIndex`, for the follower's commit advance.
    pub leader_commit: u64,
}

/// Result of an `AppendEntries` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendEntriesResult {
    /// The responder's (possibly updated) term.
    pub term: u64,
    /// Whether the consistency check passed and entries were appended.
    pub success: bool,
    /// The responder's `lastLogIndex` after handling the call.
    pub last_log_index: u64,
}

/// Arguments for a `RequestVote` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestVoteArgs {
    /// The candidate's term.
    pub term: u64,
    /// The candidate requesting a vote.
    pub candidate_id: PeerId,
    /// The candidate's `lastLogIndex`, for the freshness check.
    pub last_log_index: u64,
    /// The candidate's `lastLogTerm`, for the freshness check: the standard
    /// lexicographic `(lastLogTerm, lastLogIndex)` comparison, not an
    /// index-only check.
    pub last_log_term: u64,
}

/// Result of a `RequestVote` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestVoteResult {
    /// The responder's (possibly updated) term.
    pub term: u64,
    /// Whether the vote was granted.
    pub vote_granted: bool,
    /// The responder's `lastLogIndex`.
    pub last_log_index: u64,
}

/// The two shapes a `RESULT` envelope can carry, discriminated by a nested
/// tag so a result is self-describing without the caller needing to
/// remember which call it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result_kind")]
pub enum RpcResult {
    /// Reply to an `AppendEntries` call.
    #[serde(rename = "APPEND_ENTRIES")]
    AppendEntries(AppendEntriesResult),
    /// Reply to a `RequestVote` call.
    #[serde(rename = "REQUEST_VOTE")]
    RequestVote(RequestVoteResult),
}

/// The Raft wire envelope: `uuid` is the correlation id every outbound
/// call carries; `kind` discriminates the four message shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RaftMessage {
    /// A leader's replication/heartbeat call.
    #[serde(rename = "APPEND_ENTRIES")]
    AppendEntries {
        /// Correlation id for the reply.
        uuid: Uuid,
        /// Call arguments.
        args: AppendEntriesArgs,
    },
    /// A candidate's vote solicitation.
    #[serde(rename = "REQUEST_VOTE")]
    RequestVote {
        /// Correlation id for the reply.
        uuid: Uuid,
        /// Call arguments.
        args: RequestVoteArgs,
    },
    /// A reply to a previously-sent call.
    #[serde(rename = "RESULT")]
    Result {
        /// The correlation id of the call being answered.
        uuid: Uuid,
        /// The result payload.
        result: RpcResult,
    },
    /// A client payload forwarded to the believed leader. Modeled as its
    /// own RPC kind so the forwarding path has a concrete wire shape
    /// rather than reusing another call's.
    #[serde(rename = "CLIENT_ENTRY")]
    ClientEntry {
        /// Correlation id; unused by the receiver today but carried for
        /// symmetry with every other call kind.
        uuid: Uuid,
        /// The client's opaque payload.
        #[serde(with = "payload_b64")]
        payload: Vec<u8>,
    },
}

impl RaftMessage {
    /// The correlation id every variant carries.
    pub fn uuid(&self) -> Uuid {
        match self {
            RaftMessage::AppendEntries { uuid, .. }
            | RaftMessage::RequestVote { uuid, .. }
            | RaftMessage::Result { uuid, .. }
            | RaftMessage::ClientEntry { uuid, .. } => *uuid,
        }
    }

    /// Canonical JSON encoding.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("RaftMessage always serializes")
    }

    /// Total decode: any malformed payload yields `None` rather than an
    /// error.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_entries_roundtrip() {
        let msg = RaftMessage::AppendEntries {
            uuid: Uuid::new_v4(),
            args: AppendEntriesArgs {
                term: 2,
                leader_id: PeerId(1),
                prev_log_index: 1,
                prev_log_term: 1,
                entries: vec![LogEntry {
                    index: 2,
                    term: 2,
                    payload: b"hello".to_vec(),
                }],
                leader_commit: 1,
            },
        };
        let bytes = msg.encode();
        let decoded = RaftMessage::decode(&bytes).unwrap();
        match decoded {
            RaftMessage::AppendEntries { args, .. } => {
                assert_eq!(args.entries[0].payload, b"hello");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(RaftMessage::decode(b"not json").is_none());
        assert!(RaftMessage::decode(br#"{"kind":"NOT_A_KIND"}"#).is_none());
    }

    #[test]
    fn result_envelope_discriminates_by_nested_tag() {
        let msg = RaftMessage::Result {
            uuid: Uuid::new_v4(),
            result: RpcResult::RequestVote(RequestVoteResult {
                term: 3,
                vote_granted: true,
                last_log_index: 5,
            }),
        };
        let decoded = RaftMessage::decode(&msg.encode()).unwrap();
        assert!(matches!(
            decoded,
            RaftMessage::Result {
                result: RpcResult::RequestVote(_),
                ..
            }
        ));
    }
}
