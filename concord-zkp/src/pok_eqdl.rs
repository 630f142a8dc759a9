use concord_group::{CryptoContext, GroupElement, Scalar};
use rand::{CryptoRng, Rng};

use crate::transcript::challenge;

const LABEL: &[u8] = b"concord/pok-eqdl/v1";

/// Non-interactive Chaum-Pedersen proof of equality of discrete logs: proves
/// that `d = a^x` and `e = b^x` share the same exponent `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqDLogProof {
    /// First base.
    pub a: GroupElement,
    /// Second base.
    pub b: GroupElement,
    /// First statement, `d = a^x`.
    pub d: GroupElement,
    /// Second statement, `e = b^x`.
    pub e: GroupElement,
    /// Prover's commitment `g' = a^z`.
    pub g_prime: GroupElement,
    /// Prover's commitment `h' = b^z`.
    pub h_prime: GroupElement,
    /// Prover's response `r = z + c*x mod q`.
    pub r: Scalar,
}

impl EqDLogProof {
    /// Proves `d = a^x` and `e = b^x` for the same `x`.
    pub fn prove<R: Rng + CryptoRng>(
        ctx: &CryptoContext,
        a: &GroupElement,
        b: &GroupElement,
        x: &Scalar,
        rng: &mut R,
    ) -> Self {
        let d = ctx.pow(a, x);
        let e = ctx.pow(b, x);
        let z = ctx.random_scalar(rng);
        let g_prime = ctx.pow(a, &z);
        let h_prime = ctx.pow(b, &z);
        let c = challenge(ctx, LABEL, &[a, b, &d, &e, &g_prime, &h_prime]);
        let r = ctx.add_scalars(&z, &ctx.mul_scalars(&c, x));
        Self {
            a: a.clone(),
            b: b.clone(),
            d,
            e,
            g_prime,
            h_prime,
            r,
        }
    }

    /// Verifies `a^r == g' * d^c` and `b^r == h' * e^c`.
    pub fn verify(&self, ctx: &CryptoContext) -> bool {
        let c = challenge(
            ctx,
            LABEL,
            &[&self.a, &self.b, &self.d, &self.e, &self.g_prime, &self.h_prime],
        );
        let lhs_a = ctx.pow(&self.a, &self.r);
        let rhs_a = ctx.mul(&self.g_prime, &ctx.pow(&self.d, &c));
        let lhs_b = ctx.pow(&self.b, &self.r);
        let rhs_b = ctx.mul(&self.h_prime, &ctx.pow(&self.e, &c));
        ctx.equals(&lhs_a, &rhs_a) && ctx.equals(&lhs_b, &rhs_b)
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
        let a = ctx.generator();
        let b = ctx.pow_g(&ctx.random_scalar(&mut rng));
        let proof = EqDLogProof::prove(&ctx, &a, &b, &x, &mut rng);
        assert!(proof.verify(&ctx));
    }

    #[test]
    fn mismatched_exponents_fail() {
        let ctx = ctx();
        let mut rng = rand::thread_rng();
        let x = ctx.random_scalar(&mut rng);
        let x2 = ctx.random_scalar(&mut rng);
        let a = ctx.generator();
        let b = ctx.pow_g(&ctx.random_scalar(&mut rng));
        let mut proof = EqDLogProof::prove(&ctx, &a, &b, &x, &mut rng);
        proof.e = ctx.pow(&b, &x2);
        assert!(!proof.verify(&ctx));
    }
}
