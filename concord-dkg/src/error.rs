use crate::party::PartyId;

/// Errors surfaced by the DKG coordinator and decryption helpers.
///
/// None of these are fatal to the running node: the caller (the
/// per-session coordinator instance, or the node wiring it up) either
/// drops the offending message and continues, or excludes the offending
/// party from the computed joint key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DkgError {
    /// A message carried a session id different from the one this
    /// coordinator was constructed for.
    #[error("message for session {got:?} delivered to coordinator for session {expected:?}")]
    SessionMismatch {
        /// The session id this coordinator is scoped to.
        expected: String,
        /// The session id carried by the offending message.
        got: String,
    },
    /// A commitment or opening was received twice from the same party.
    #[error("duplicate contribution from party {0}")]
    DuplicateContribution(PartyId),
    /// An opening arrived for a party whose commitment was never observed,
    /// or whose commitment arrived after its opening.
    #[error("opening from party {0} has no matching prior commitment")]
    OpeningBeforeCommitment(PartyId),
}
