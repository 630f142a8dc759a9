use concord_dkg::CryptoMessage;
use concord_raft_types::RaftMessage;

/// Either half of the two disjoint wire codecs this node speaks.
#[derive(Debug)]
pub enum InboundMessage {
    /// A Raft RPC call or result.
    Raft(RaftMessage),
    /// A DKG/decryption crypto message.
    Crypto(CryptoMessage),
}

/// Strips the `"<src_peer_id>:"` prefix a peer-to-peer hop prepends and
/// parses the sender's id.
///
/// Returns `None` on anything malformed: no colon, a non-numeric prefix,
/// or non-UTF-8 bytes. Malformed inbound payloads are dropped silently,
/// never raised.
pub fn strip_peer_prefix(raw: &[u8]) -> Option<(u16, &[u8])> {
    let text = std::str::from_utf8(raw).ok()?;
    let (prefix, rest) = text.split_once(':')?;
    let peer_id: u16 = prefix.parse().ok()?;
    Some((peer_id, rest.as_bytes()))
}

/// Decodes an already-unprefixed payload as either a Raft RPC or a crypto
/// message. Tries the Raft codec first; the two `kind` vocabularies are
/// disjoint, so a Raft parse failure unambiguously means "try crypto".
pub fn decode_inbound(payload: &[u8]) -> Option<InboundMessage> {
    if let Some(msg) = RaftMessage::decode(payload) {
        return Some(InboundMessage::Raft(msg));
    }
    CryptoMessage::decode(payload).map(InboundMessage::Crypto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_numeric_prefix() {
        let (peer, rest) = strip_peer_prefix(b"3:{\"kind\":\"RESULT\"}").unwrap();
        assert_eq!(peer, 3);
        assert_eq!(rest, b"{\"kind\":\"RESULT\"}");
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(strip_peer_prefix(b"no-colon-here").is_none());
    }

    #[test]
    fn rejects_non_numeric_prefix() {
        assert!(strip_peer_prefix(b"abc:{}").is_none());
    }
}
