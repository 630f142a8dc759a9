use concord_group::{CryptoContext, GroupElement, Scalar};
use rand::{CryptoRng, Rng};

use crate::transcript::challenge;

const LABEL: &[u8] = b"concord/pok-dl/v1";

/// Non-interactive Schnorr proof of knowledge of a discrete log: proves
/// knowledge of `x` such that `y = g^x`.
///
/// Self-contained: carries the statement (`g`, `y`) alongside the proof
/// (`t`, `r`) so a verifier only needs a [`CryptoContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DLogProof {
    /// The base the statement is expressed over.
    pub g: GroupElement,
    /// The public statement `y = g^x`.
    pub y: GroupElement,
    /// The prover's commitment `t = g^z`.
    pub t: GroupElement,
    /// The prover's response `r = z + c*x mod q`.
    pub r: Scalar,
}

impl DLogProof {
    /// Proves knowledge of `x` for the statement `y = g^x`.
    pub fn prove<R: Rng + CryptoRng>(
        ctx: &CryptoContext,
        g: &GroupElement,
        x: &Scalar,
        rng: &mut R,
    ) -> Self {
        let y = ctx.pow(g, x);
        let z = ctx.random_scalar(rng);
        let t = ctx.pow(g, &z);
        let c = challenge(ctx, LABEL, &[g, &y, &t]);
        let r = ctx.add_scalars(&z, &ctx.mul_scalars(&c, x));
        Self {
            g: g.clone(),
            y,
            t,
            r,
        }
    }

    /// Verifies `g^r == t * y^c` where `c` is re-derived via Fiat-Shamir.
    pub fn verify(&self, ctx: &CryptoContext) -> bool {
        let c = challenge(ctx, LABEL, &[&self.g, &self.y, &self.t]);
        let lhs = ctx.pow(&self.g, &self.r);
        let rhs = ctx.mul(&self.t, &ctx.pow(&self.y, &c));
        ctx.equals(&lhs, &rhs)
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
    fn honest_proof_verifies() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();
        let x = ctx.random_scalar(&mut rng);
        let proof = DLogProof::prove(&ctx, &ctx.generator(), &x, &mut rng);
        assert!(proof.verify(&ctx));
    }

    #[test]
    fn tampered_statement_fails() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();
        let x = ctx.random_scalar(&mut rng);
        let mut proof = DLogProof::prove(&ctx, &ctx.generator(), &x, &mut rng);
        proof.y = ctx.pow_g(&ctx.random_scalar(&mut rng));
        assert!(!proof.verify(&ctx));
    }
}
