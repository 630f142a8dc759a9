use concord_group::{CryptoContext, GroupElement};
use concord_zkp::EqDLogProof;
use rand::{CryptoRng, Rng};

use crate::party::PartyId;
use crate::share::KeyShare;

/// An ElGamal ciphertext encrypted under a [`KeyShare::joint_public_key`].
///
/// `c1 = g^k`, `c2 = m * Y^k` for a random `k <- [1,q)`. Corresponds to the
/// `POST_VOTE` crypto message kind: a value is "posted" against the joint
/// key and later opened by a distributed decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalCiphertext {
    /// `g^k`.
    pub c1: GroupElement,
    /// `m * Y^k`.
    pub c2: GroupElement,
}

impl ElGamalCiphertext {
    /// Encrypts `m` under the joint public key `joint_public_key`.
    pub fn encrypt<R: Rng + CryptoRng>(
        ctx: &CryptoContext,
        joint_public_key: &GroupElement,
        m: &GroupElement,
        rng: &mut R,
    ) -> Self {
        let k = ctx.random_scalar(rng);
        let c1 = ctx.pow_g(&k);
        let c2 = ctx.mul(m, &ctx.pow(joint_public_key, &k));
        Self { c1, c2 }
    }
}

/// One node's partial decryption share for an [`ElGamalCiphertext`], carrying
/// a PoK-EqDL binding the share to its public key share `y_i`, corresponding
/// to the `DECRYPT_SHARE` crypto message kind.
pub struct DecryptionShare {
    /// The contributing party.
    pub party_id: PartyId,
    /// `c1^{x_i}`.
    pub share: GroupElement,
    /// Proves `share` and `y_i` (the party's public key share) have the
    /// same discrete log `x_i`, over bases `(g, c1)` respectively.
    pub proof: EqDLogProof,
}

impl KeyShare {
    /// Computes this node's partial decryption share of `ciphertext.c1`.
    ///
    /// Requires `party_id`, the id this node was assigned in the DKG run
    /// that produced this [`KeyShare`].
    pub fn partial_decrypt<R: Rng + CryptoRng>(
        &self,
        ctx: &CryptoContext,
        party_id: PartyId,
        ciphertext: &ElGamalCiphertext,
        rng: &mut R,
    ) -> DecryptionShare {
        let share = ctx.pow(&ciphertext.c1, self.secret());
        let proof = EqDLogProof::prove(ctx, &ctx.generator(), &ciphertext.c1, self.secret(), rng);
        DecryptionShare {
            party_id,
            share,
            proof,
        }
    }
}

/// Combines verified decryption shares into the plaintext group element.
///
/// Every share is checked against the caller-supplied public key share
/// `y_i` for its party before being folded in; a share that fails
/// verification is excluded, mirroring the DKG's exclude-on-failure
/// disposition. Recovering the plaintext requires shares from every one
/// of the `N` parties whose `y_i` contributed to the joint public key —
/// this is an N-out-of-N scheme, not a threshold one.
///
/// Returns `None` if any supplied `(share, y_i)` pair fails verification.
pub fn combine_decryption_shares(
    ctx: &CryptoContext,
    ciphertext: &ElGamalCiphertext,
    shares: &[(DecryptionShare, GroupElement)],
) -> Option<GroupElement> {
    let mut combined = ctx.identity();
    for (decryption_share, y_i) in shares {
        if decryption_share.proof.d != *y_i || decryption_share.proof.e != decryption_share.share {
            tracing::warn!(party_id = %decryption_share.party_id, "decryption share does not match its own proof statement");
            return None;
        }
        if decryption_share.proof.a != ctx.generator() || decryption_share.proof.b != ciphertext.c1
        {
            tracing::warn!(party_id = %decryption_share.party_id, "decryption share proof is over the wrong bases");
            return None;
        }
        if !decryption_share.proof.verify(ctx) {
            tracing::warn!(party_id = %decryption_share.party_id, "decryption share proof failed verification");
            return None;
        }
        combined = ctx.mul(&combined, &decryption_share.share);
    }
    let combined_inv = ctx.inverse(&combined).ok()?;
    Some(ctx.mul(&ciphertext.c2, &combined_inv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn ctx() -> CryptoContext {
        CryptoContext::new(BigUint::from(23u32), BigUint::from(4u32)).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip_two_parties() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();

        let x0 = ctx.random_scalar(&mut rng);
        let x1 = ctx.random_scalar(&mut rng);
        let y0 = ctx.pow_g(&x0);
        let y1 = ctx.pow_g(&x1);
        let joint = ctx.mul(&y0, &y1);

        let share0 = KeyShare::new(joint.clone(), x0, y0.clone());
        let share1 = KeyShare::new(joint.clone(), x1, y1.clone());

        let m = ctx.pow_g(&ctx.random_scalar(&mut rng));
        let ciphertext = ElGamalCiphertext::encrypt(&ctx, &joint, &m, &mut rng);

        let d0 = share0.partial_decrypt(&ctx, PartyId(0), &ciphertext, &mut rng);
        let d1 = share1.partial_decrypt(&ctx, PartyId(1), &ciphertext, &mut rng);

        let recovered = combine_decryption_shares(
            &ctx,
            &ciphertext,
            &[(d0, y0.clone()), (d1, y1.clone())],
        )
        .unwrap();
        assert_eq!(recovered, m);
    }

    #[test]
    fn forged_share_is_rejected() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();

        let x0 = ctx.random_scalar(&mut rng);
        let y0 = ctx.pow_g(&x0);
        let share0 = KeyShare::new(y0.clone(), x0, y0.clone());

        let m = ctx.pow_g(&ctx.random_scalar(&mut rng));
        let ciphertext = ElGamalCiphertext::encrypt(&ctx, &y0, &m, &mut rng);
        let mut forged = share0.partial_decrypt(&ctx, PartyId(0), &ciphertext, &mut rng);
        forged.share = ctx.pow_g(&ctx.random_scalar(&mut rng));

        assert!(combine_decryption_shares(&ctx, &ciphertext, &[(forged, y0)]).is_none());
    }
}
