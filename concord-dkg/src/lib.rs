//! Threshold-ElGamal distributed key generation and the crypto message
//! codec that carries its commit/open rounds over the wire.
//!
//! Every node in the group runs one [`DkgCoordinator`] per session id. Once
//! [`DkgCoordinator::commitment`]/[`DkgCoordinator::opening`] have each been
//! broadcast and all `N` peers' contributions observed, [`DkgCoordinator`]
//! resolves to a [`KeyShare`] holding the joint public key and this node's
//! private share — which [`KeyShare::partial_decrypt`] can later use to
//! contribute to a threshold ElGamal decryption.

mod coordinator;
mod decrypt;
mod error;
mod message;
mod party;
mod share;

pub use coordinator::DkgCoordinator;
pub use decrypt::{combine_decryption_shares, DecryptionShare, ElGamalCiphertext};
pub use error::DkgError;
pub use message::{CryptoMessage, WireDLogProof, WireEqDLogProof};
pub use party::PartyId;
pub use share::{KeyShare, LocalShare};
