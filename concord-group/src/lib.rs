//! Prime-order multiplicative-group arithmetic mod a public safe prime `p`.
//!
//! This is the group used by the threshold-ElGamal DKG and its Schnorr-style
//! proofs (`concord-zkp`, `concord-dkg`): the multiplicative group of integers
//! mod `p`, with `p = 2q + 1` for a prime `q` (the safe-prime assumption),
//! a fixed generator `g` of the order-`q` subgroup, and exponents drawn
//! from `[1, q)`.
//!
//! All arithmetic is performed through a [`CryptoContext`] rather than as
//! inherent methods on [`GroupElement`]/[`Scalar`], because `p` and `q` are
//! runtime values, not compile-time curve parameters.

mod context;
mod element;
mod scalar;

pub use context::CryptoContext;
pub use element::GroupElement;
pub use scalar::Scalar;

/// Errors produced by group-arithmetic operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    /// A decoded integer was not in `[0, p)`.
    #[error("value is not a canonical element of the group (>= p)")]
    NotCanonical,
    /// A decoded integer was not in the expected scalar range `[0, q)`.
    #[error("value is not a canonical scalar (>= q)")]
    ScalarNotCanonical,
    /// The byte string had the wrong length for the context's modulus.
    #[error("expected {expected} bytes, got {got}")]
    WrongLength {
        /// Expected, fixed-width encoding length.
        expected: usize,
        /// Actual length of the supplied byte string.
        got: usize,
    },
    /// Attempted to invert the additive identity / a non-invertible element.
    #[error("element has no inverse")]
    NotInvertible,
    /// The context parameters themselves are invalid (e.g. `g` not in `[1,p)`).
    #[error("invalid context parameters: {0}")]
    InvalidParameters(&'static str),
    /// The base64 wire encoding did not decode to a valid byte string.
    #[error("invalid base64 encoding")]
    InvalidEncoding,
}
