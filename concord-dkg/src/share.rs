use concord_group::{CryptoContext, GroupElement, Scalar};
use concord_zkp::DLogProof;
use rand::{CryptoRng, Rng};
use zeroize::Zeroize;

/// This node's private contribution to a DKG run: a secret exponent, its
/// public component, a proof of knowledge of the secret, and a binding
/// commitment to the public component.
///
/// The secret exponent is zeroized on drop; the rest of the struct is
/// public information anyway.
pub struct LocalShare {
    x: Scalar,
    y: GroupElement,
    pok: DLogProof,
    commitment: [u8; 32],
}

impl Drop for LocalShare {
    fn drop(&mut self) {
        self.x.zeroize();
    }
}

impl LocalShare {
    /// Generates a fresh local share: `x <- [1,q)`, `y = g^x`, a PoK-DL over
    /// `(g, y, x)`, and `commitment = H(y)`.
    pub fn generate<R: Rng + CryptoRng>(ctx: &CryptoContext, rng: &mut R) -> Self {
        let x = ctx.random_scalar(rng);
        let g = ctx.generator();
        let y = ctx.pow(&g, &x);
        let pok = DLogProof::prove(ctx, &g, &x, rng);
        let commitment = commit(ctx, &y);
        Self { x, y, pok, commitment }
    }

    /// The public component `y_i = g^{x_i}`.
    pub fn public(&self) -> &GroupElement {
        &self.y
    }

    /// The proof of knowledge of `x_i` over `(g, y_i)`.
    pub fn proof(&self) -> &DLogProof {
        &self.pok
    }

    /// The binding commitment `H(y_i)` broadcast in the commit round.
    pub fn commitment(&self) -> [u8; 32] {
        self.commitment
    }

    /// The private exponent, for use once the DKG session has completed.
    pub(crate) fn secret(&self) -> &Scalar {
        &self.x
    }
}

/// `H(y) = blake3(canonical encoding of y)`.
///
/// The hash function is left abstract as "a collision-resistant hash";
/// this workspace fixes it to `blake3` throughout.
pub(crate) fn commit(ctx: &CryptoContext, y: &GroupElement) -> [u8; 32] {
    blake3::hash(&ctx.encode(y)).into()
}

/// The outcome of a completed DKG session: the joint public key and this
/// node's own private share.
pub struct KeyShare {
    /// `Y = product of y_j over every party whose commit and opening verified`.
    pub joint_public_key: GroupElement,
    x: Scalar,
    /// This node's own public component `y_i`.
    pub public: GroupElement,
}

impl Drop for KeyShare {
    fn drop(&mut self) {
        self.x.zeroize();
    }
}

impl KeyShare {
    pub(crate) fn new(joint_public_key: GroupElement, x: Scalar, public: GroupElement) -> Self {
        Self {
            joint_public_key,
            x,
            public,
        }
    }

    /// This node's private exponent share of the joint secret key.
    pub fn secret(&self) -> &Scalar {
        &self.x
    }
}
