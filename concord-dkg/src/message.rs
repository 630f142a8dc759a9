use concord_group::{CryptoContext, GroupElement};
use concord_zkp::{DLogProof, EqDLogProof};
use serde::{Deserialize, Serialize};

use crate::party::PartyId;

/// base64-encodes a raw commitment/ciphertext byte string for the wire.
pub fn encode_bytes_b64(bytes: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decodes a base64 string into raw bytes, e.g. a 32-byte `blake3` commitment.
pub fn decode_bytes_b64(s: &str) -> Option<Vec<u8>> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}

/// The self-describing, self-framed crypto message envelope: a `kind`
/// discriminant, a `session_id` scoping the message to one DKG (or
/// decryption) run, and kind-specific fields.
///
/// Group elements, scalars, and proof components are carried as base64
/// strings at this layer; [`CryptoMessage`] only performs the
/// *structural* half of decoding (JSON shape, kind tag). The numeric/crypto
/// half — turning a base64 string into a validated [`GroupElement`] — needs
/// a [`CryptoContext`] and is done by the coordinator that consumes the
/// message, via the `decode_*` helpers below. Both halves fail open: a
/// structural parse failure returns `None` from [`CryptoMessage::decode`],
/// and a crypto-level parse failure returns `None` from the relevant
/// `decode_*` helper. Neither ever panics or raises.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CryptoMessage {
    /// Round 1 of DKG: a binding commitment to `y_i`.
    #[serde(rename = "KEYGEN_COMMIT")]
    KeygenCommit {
        /// The DKG run this message belongs to.
        session_id: String,
        /// The sender.
        party_id: PartyId,
        /// `base64(H(y_i))`.
        commitment: String,
    },
    /// Round 2 of DKG: the opening of a prior commitment.
    #[serde(rename = "KEYGEN_OPENING")]
    KeygenOpening {
        /// The DKG run this message belongs to.
        session_id: String,
        /// The sender.
        party_id: PartyId,
        /// `base64(y_i)`.
        y: String,
        /// The PoK-DL over `(g, y_i)`.
        pok: WireDLogProof,
    },
    /// An encrypted vote posted against the joint public key, to later be
    /// opened via a threshold decryption.
    #[serde(rename = "POST_VOTE")]
    PostVote {
        /// The DKG run whose joint key this ciphertext is encrypted under.
        session_id: String,
        /// `base64(c1)`.
        c1: String,
        /// `base64(c2)`.
        c2: String,
    },
    /// A node's partial decryption share for a posted ciphertext.
    #[serde(rename = "DECRYPT_SHARE")]
    DecryptShare {
        /// The DKG run whose key share this decryption contributes.
        session_id: String,
        /// The sender.
        party_id: PartyId,
        /// `base64(c1^{x_i})`.
        share: String,
        /// The PoK-EqDL binding the share to the sender's public key share.
        proof: WireEqDLogProof,
    },
}

impl CryptoMessage {
    /// The session id every variant carries.
    pub fn session_id(&self) -> &str {
        match self {
            CryptoMessage::KeygenCommit { session_id, .. }
            | CryptoMessage::KeygenOpening { session_id, .. }
            | CryptoMessage::PostVote { session_id, .. }
            | CryptoMessage::DecryptShare { session_id, .. } => session_id,
        }
    }

    /// Canonical JSON encoding.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("CryptoMessage always serializes")
    }

    /// Total structural decode: any JSON/shape failure yields `None`
    /// instead of an error.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

/// Wire form of [`concord_zkp::DLogProof`]: every field base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDLogProof {
    /// `base64(g)`.
    pub g: String,
    /// `base64(y)`.
    pub y: String,
    /// `base64(t)`.
    pub t: String,
    /// `base64(r)`.
    pub r: String,
}

impl WireDLogProof {
    /// Encodes a [`DLogProof`] to its wire form.
    pub fn from_proof(ctx: &CryptoContext, proof: &DLogProof) -> Self {
        Self {
            g: ctx.encode_b64(&proof.g),
            y: ctx.encode_b64(&proof.y),
            t: ctx.encode_b64(&proof.t),
            r: ctx.encode_scalar_b64(&proof.r),
        }
    }

    /// Decodes into a [`DLogProof`], or `None` on any malformed field.
    pub fn decode(&self, ctx: &CryptoContext) -> Option<DLogProof> {
        Some(DLogProof {
            g: ctx.decode_b64(&self.g).ok()?,
            y: ctx.decode_b64(&self.y).ok()?,
            t: ctx.decode_b64(&self.t).ok()?,
            r: ctx.decode_scalar_b64(&self.r).ok()?,
        })
    }
}

/// Wire form of [`concord_zkp::EqDLogProof`]: every field base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEqDLogProof {
    /// `base64(a)`.
    pub a: String,
    /// `base64(b)`.
    pub b: String,
    /// `base64(d)`.
    pub d: String,
    /// `base64(e)`.
    pub e: String,
    /// `base64(g')`.
    pub g_prime: String,
    /// `base64(h')`.
    pub h_prime: String,
    /// `base64(r)`.
    pub r: String,
}

impl WireEqDLogProof {
    /// Encodes an [`EqDLogProof`] to its wire form.
    pub fn from_proof(ctx: &CryptoContext, proof: &EqDLogProof) -> Self {
        Self {
            a: ctx.encode_b64(&proof.a),
            b: ctx.encode_b64(&proof.b),
            d: ctx.encode_b64(&proof.d),
            e: ctx.encode_b64(&proof.e),
            g_prime: ctx.encode_b64(&proof.g_prime),
            h_prime: ctx.encode_b64(&proof.h_prime),
            r: ctx.encode_scalar_b64(&proof.r),
        }
    }

    /// Decodes into an [`EqDLogProof`], or `None` on any malformed field.
    pub fn decode(&self, ctx: &CryptoContext) -> Option<EqDLogProof> {
        Some(EqDLogProof {
            a: ctx.decode_b64(&self.a).ok()?,
            b: ctx.decode_b64(&self.b).ok()?,
            d: ctx.decode_b64(&self.d).ok()?,
            e: ctx.decode_b64(&self.e).ok()?,
            g_prime: ctx.decode_b64(&self.g_prime).ok()?,
            h_prime: ctx.decode_b64(&self.h_prime).ok()?,
            r: ctx.decode_scalar_b64(&self.r).ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        assert!(CryptoMessage::decode(b"not json").is_none());
        assert!(CryptoMessage::decode(br#"{"kind":"NOT_A_KIND"}"#).is_none());
    }

    #[test]
    fn encode_decode_roundtrip() {
        let msg = CryptoMessage::KeygenCommit {
            session_id: "s1".into(),
            party_id: PartyId(0),
            commitment: "deadbeef".into(),
        };
        let bytes = msg.encode();
        let decoded = CryptoMessage::decode(&bytes).unwrap();
        assert_eq!(decoded.session_id(), "s1");
    }
}
