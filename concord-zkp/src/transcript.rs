use concord_group::{CryptoContext, GroupElement, Scalar};
use num_bigint::BigUint;

/// Domain-separated Fiat-Shamir challenge: hashes a label and a sequence of
/// group elements (in their canonical fixed-width encoding)
/// with `blake3`, then reduces the extensible output mod `q`.
///
/// The 64-byte output width is wide enough that reducing mod `q`
/// introduces negligible modulo bias.
pub(crate) fn challenge(ctx: &CryptoContext, label: &[u8], elements: &[&GroupElement]) -> Scalar {
    let mut hasher = blake3::Hasher::new();
    hasher.update(label);
    for element in elements {
        hasher.update(&ctx.encode(element));
    }
    let mut xof = hasher.finalize_xof();
    let mut wide = [0u8; 64];
    xof.fill(&mut wide);
    ctx.scalar_from_biguint_mod_q(BigUint::from_bytes_be(&wide))
}
