//! Non-interactive zero-knowledge proofs over [`concord_group`]'s prime-order
//! group, both built from the Fiat-Shamir heuristic applied to a Schnorr
//! sigma-protocol.

mod pok_dl;
mod pok_eqdl;
mod transcript;

pub use pok_dl::DLogProof;
pub use pok_eqdl::EqDLogProof;
