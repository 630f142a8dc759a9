use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// An exponent / secret scalar, reduced mod `q` (the group order).
///
/// Invariant: `0 <= value < q` for whichever [`crate::CryptoContext`]
/// produced it. `Scalar` does not implement `Copy` or `Clone` blanket
/// derives that would encourage stashing secret exponents around; callers
/// that need a private key long-term should wrap it themselves (see
/// `concord-dkg::LocalShare`, which is `ZeroizeOnDrop`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scalar(pub(crate) BigUint);

impl Scalar {
    pub(crate) fn from_reduced(value: BigUint) -> Self {
        Self(value)
    }

    /// Returns the canonical integer representation.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 = BigUint::default();
    }
}
