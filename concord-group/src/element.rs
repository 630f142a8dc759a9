use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// An element of the multiplicative group of integers mod `p`.
///
/// Invariant: the wrapped integer is always reduced, i.e. `0 <= value < p`
/// for whichever [`crate::CryptoContext`] produced it. Equality and hashing
/// use the canonical integer representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupElement(pub(crate) BigUint);

impl GroupElement {
    /// Wraps an already-reduced integer without checking against any `p`.
    ///
    /// Only [`crate::CryptoContext`] should call this; it is the single seam
    /// through which the "reduced mod p" invariant can be broken, so every
    /// caller outside this crate must go through context methods instead.
    pub(crate) fn from_reduced(value: BigUint) -> Self {
        Self(value)
    }

    /// Returns the canonical integer representation.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl std::fmt::Display for GroupElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
