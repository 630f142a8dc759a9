use std::collections::HashMap;
use std::time::Duration;

use concord_group::{CryptoContext, GroupElement};
use parking_lot::{Condvar, Mutex};
use rand::{CryptoRng, Rng};

use crate::error::DkgError;
use crate::message::{CryptoMessage, WireDLogProof};
use crate::party::PartyId;
use crate::share::{commit, KeyShare, LocalShare};

struct Opening {
    y: GroupElement,
    verified: bool,
}

struct Inner {
    commitments: HashMap<PartyId, [u8; 32]>,
    openings: HashMap<PartyId, Opening>,
}

/// Runs one node's side of a single DKG session.
///
/// Scoped to exactly one `session_id`: any [`CryptoMessage`] carrying a
/// different session id is rejected with [`DkgError::SessionMismatch`]
/// rather than consumed. Waiting for the commit/opening rounds to fill
/// is done on a [`Condvar`], not a spin loop.
pub struct DkgCoordinator {
    session_id: String,
    self_id: PartyId,
    n: usize,
    local: LocalShare,
    state: Mutex<Inner>,
    cv: Condvar,
}

impl DkgCoordinator {
    /// Starts a new session: generates this node's [`LocalShare`] and
    /// records it as this node's own commitment.
    pub fn new<R: Rng + CryptoRng>(
        session_id: impl Into<String>,
        self_id: PartyId,
        n: usize,
        ctx: &CryptoContext,
        rng: &mut R,
    ) -> Self {
        let local = LocalShare::generate(ctx, rng);
        let mut commitments = HashMap::with_capacity(n);
        commitments.insert(self_id, local.commitment());
        let mut openings = HashMap::with_capacity(n);
        openings.insert(
            self_id,
            Opening {
                y: local.public().clone(),
                verified: true,
            },
        );
        Self {
            session_id: session_id.into(),
            self_id,
            n,
            local,
            state: Mutex::new(Inner {
                commitments,
                openings,
            }),
            cv: Condvar::new(),
        }
    }

    /// The session id this coordinator is scoped to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// This node's commit-round message, to broadcast.
    pub fn commitment(&self) -> CryptoMessage {
        CryptoMessage::KeygenCommit {
            session_id: self.session_id.clone(),
            party_id: self.self_id,
            commitment: crate::message::encode_bytes_b64(&self.local.commitment()),
        }
    }

    /// This node's open-round message, to broadcast once all `N`
    /// commitments are known.
    pub fn opening(&self, ctx: &CryptoContext) -> CryptoMessage {
        CryptoMessage::KeygenOpening {
            session_id: self.session_id.clone(),
            party_id: self.self_id,
            y: ctx.encode_b64(self.local.public()),
            pok: WireDLogProof::from_proof(ctx, self.local.proof()),
        }
    }

    /// Accepts an inbound [`CryptoMessage`], updating the commit/open maps.
    ///
    /// Unknown kinds (`POST_VOTE`, `DECRYPT_SHARE`) are not part of the DKG
    /// rounds and are ignored rather than rejected. Returns
    /// [`DkgError::SessionMismatch`] if the message belongs to a different
    /// session. An opening that arrives for a party with no recorded
    /// commitment, or whose commitment fails to match, does not error — it
    /// is recorded but will simply never verify.
    pub fn ingest(&self, ctx: &CryptoContext, msg: &CryptoMessage) -> Result<(), DkgError> {
        if msg.session_id() != self.session_id {
            return Err(DkgError::SessionMismatch {
                expected: self.session_id.clone(),
                got: msg.session_id().to_string(),
            });
        }
        match msg {
            CryptoMessage::KeygenCommit {
                party_id,
                commitment,
                ..
            } => {
                let Some(bytes) = crate::message::decode_bytes_b64(commitment) else {
                    tracing::warn!(%party_id, "malformed commitment, dropping");
                    return Ok(());
                };
                let Ok(commitment): Result<[u8; 32], _> = bytes.try_into() else {
                    tracing::warn!(%party_id, "commitment has wrong length, dropping");
                    return Ok(());
                };
                let mut state = self.state.lock();
                if state.commitments.contains_key(party_id) {
                    tracing::debug!(%party_id, "duplicate commitment, ignoring");
                    return Ok(());
                }
                state.commitments.insert(*party_id, commitment);
                self.cv.notify_all();
            }
            CryptoMessage::KeygenOpening {
                party_id, y, pok, ..
            } => {
                let (Some(y), Some(pok)) = (ctx.decode_b64(y).ok(), pok.decode(ctx)) else {
                    tracing::warn!(%party_id, "malformed opening, dropping");
                    return Ok(());
                };
                let mut state = self.state.lock();
                if state.openings.contains_key(party_id) {
                    tracing::debug!(%party_id, "duplicate opening, ignoring");
                    return Ok(());
                }
                let commitment_known = state.commitments.contains_key(party_id);
                let commitment_matches = state
                    .commitments
                    .get(party_id)
                    .is_some_and(|c| *c == commit(ctx, &y));
                let pok_valid = pok.y == y && pok.verify(ctx);
                let verified = commitment_known && commitment_matches && pok_valid;
                if !verified {
                    tracing::warn!(%party_id, "opening excluded: commitment mismatch or invalid proof");
                }
                state.openings.insert(*party_id, Opening { y, verified });
                self.cv.notify_all();
            }
            CryptoMessage::PostVote { .. } | CryptoMessage::DecryptShare { .. } => {}
        }
        Ok(())
    }

    /// Blocks until all `N` commitments have been observed.
    pub fn wait_for_commitments(&self) {
        let mut state = self.state.lock();
        while state.commitments.len() < self.n {
            self.cv.wait(&mut state);
        }
    }

    /// Blocks until all `N` openings have been observed.
    pub fn wait_for_openings(&self) {
        let mut state = self.state.lock();
        while state.openings.len() < self.n {
            self.cv.wait(&mut state);
        }
    }

    /// Same as [`Self::wait_for_openings`], but gives up after `timeout`:
    /// one silent peer stalls the protocol, by design, so callers that
    /// want to notice this should use this instead of blocking forever.
    pub fn wait_for_openings_timeout(&self, timeout: Duration) -> bool {
        let mut state = self.state.lock();
        let deadline = std::time::Instant::now() + timeout;
        while state.openings.len() < self.n {
            let now = std::time::Instant::now();
            if now >= deadline {
                return false;
            }
            let result = self.cv.wait_for(&mut state, deadline - now);
            if result.timed_out() && state.openings.len() < self.n {
                return false;
            }
        }
        true
    }

    /// Finalizes the session: computes `Y = product of y_j` over every
    /// party whose commit and opening both verified, and returns this
    /// node's [`KeyShare`].
    ///
    /// Accepting is deterministic given the same inputs: the accepted
    /// set depends only on which openings verified, not on arrival
    /// order.
    pub fn finalize(self, ctx: &CryptoContext) -> KeyShare {
        let state = self.state.into_inner();
        let mut joint = ctx.identity();
        let mut accepted: Vec<PartyId> = state
            .openings
            .iter()
            .filter(|(_, opening)| opening.verified)
            .map(|(id, _)| *id)
            .collect();
        accepted.sort();
        for id in &accepted {
            joint = ctx.mul(&joint, &state.openings[id].y);
        }
        tracing::info!(n_accepted = accepted.len(), n_total = self.n, "DKG session finalized");
        KeyShare::new(joint, self.local.secret().clone(), self.local.public().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn ctx() -> CryptoContext {
        CryptoContext::new(BigUint::from(23u32), BigUint::from(4u32)).unwrap()
    }

    #[test]
    fn three_honest_parties_agree_on_joint_key() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();
        let ids = [PartyId(0), PartyId(1), PartyId(2)];
        let session = "session-1";

        let coordinators: Vec<_> = ids
            .iter()
            .map(|id| DkgCoordinator::new(session, *id, ids.len(), &ctx, &mut rng))
            .collect();

        let commits: Vec<_> = coordinators.iter().map(|c| c.commitment()).collect();
        for c in &coordinators {
            for m in &commits {
                c.ingest(&ctx, m).unwrap();
            }
            c.wait_for_commitments();
        }

        let openings: Vec<_> = coordinators.iter().map(|c| c.opening(&ctx)).collect();
        for c in &coordinators {
            for m in &openings {
                c.ingest(&ctx, m).unwrap();
            }
            c.wait_for_openings();
        }

        let shares: Vec<_> = coordinators.into_iter().map(|c| c.finalize(&ctx)).collect();
        for pair in shares.windows(2) {
            assert_eq!(pair[0].joint_public_key, pair[1].joint_public_key);
        }
    }

    #[test]
    fn opening_with_mismatched_commitment_is_excluded() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();
        let session = "session-2";
        let n = 2;

        let honest = DkgCoordinator::new(session, PartyId(0), n, &ctx, &mut rng);
        let attacker = DkgCoordinator::new(session, PartyId(1), n, &ctx, &mut rng);

        honest.ingest(&ctx, &honest.commitment()).unwrap();
        honest.ingest(&ctx, &attacker.commitment()).unwrap();
        honest.wait_for_commitments();

        // Attacker opens to a y different from the one it committed to.
        let forged_share = LocalShare::generate(&ctx, &mut rng);
        let forged_opening = CryptoMessage::KeygenOpening {
            session_id: session.to_string(),
            party_id: PartyId(1),
            y: ctx.encode_b64(forged_share.public()),
            pok: WireDLogProof::from_proof(&ctx, forged_share.proof()),
        };

        honest.ingest(&ctx, &honest.opening(&ctx)).unwrap();
        honest.ingest(&ctx, &forged_opening).unwrap();
        honest.wait_for_openings();

        let result = honest.finalize(&ctx);
        assert_eq!(result.joint_public_key, result.public);
    }

    #[test]
    fn message_from_other_session_is_rejected() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();
        let coordinator = DkgCoordinator::new("session-a", PartyId(0), 2, &ctx, &mut rng);
        let other = DkgCoordinator::new("session-b", PartyId(1), 2, &ctx, &mut rng);
        assert!(matches!(
            coordinator.ingest(&ctx, &other.commitment()),
            Err(DkgError::SessionMismatch { .. })
        ));
    }
}
