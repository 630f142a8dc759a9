use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};

use crate::{GroupElement, GroupError, Scalar};

/// The public parameters of the group: the prime `p`, its associated
/// safe-prime order `q = (p-1)/2`, and a fixed generator `g` of the
/// order-`q` subgroup.
///
/// `CryptoContext` is the sole owner of group arithmetic: `p`/`q` are
/// runtime values (not const generics), so every operation on
/// [`GroupElement`]/[`Scalar`] is a method here rather than an inherent
/// method on those newtypes.
#[derive(Debug, Clone)]
pub struct CryptoContext {
    p: BigUint,
    q: BigUint,
    g: GroupElement,
    encoded_len: usize,
}

impl CryptoContext {
    /// Builds a context from an explicit safe prime `p` and generator `g`.
    ///
    /// `q` is derived as `(p-1)/2`; this is *not* itself checked for
    /// primality here (that is a property of the chosen public parameters,
    /// established once out of band), but `g` is checked to be a canonical,
    /// non-identity element of `[1, p)`.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self, GroupError> {
        if p < BigUint::from(5u8) {
            return Err(GroupError::InvalidParameters("p too small"));
        }
        if g.is_zero() || g >= p {
            return Err(GroupError::InvalidParameters(
                "generator must be in [1, p)",
            ));
        }
        let q = (&p - BigUint::one()) / BigUint::from(2u8);
        let encoded_len = p.to_bytes_be().len();
        Ok(Self {
            p,
            q,
            g: GroupElement::from_reduced(g),
            encoded_len,
        })
    }

    /// The group's prime modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// The subgroup order `q = (p-1)/2`.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The fixed generator `g`.
    pub fn generator(&self) -> GroupElement {
        self.g.clone()
    }

    /// The multiplicative identity element.
    pub fn identity(&self) -> GroupElement {
        GroupElement::from_reduced(BigUint::one())
    }

    /// Fixed-width big-endian encoding length, equal to the byte length of `p`.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    /// `a * b mod p`.
    pub fn mul(&self, a: &GroupElement, b: &GroupElement) -> GroupElement {
        GroupElement::from_reduced((&a.0 * &b.0) % &self.p)
    }

    /// `base^exp mod p`.
    pub fn pow(&self, base: &GroupElement, exp: &Scalar) -> GroupElement {
        GroupElement::from_reduced(base.0.modpow(&exp.0, &self.p))
    }

    /// `g^exp mod p`, i.e. [`CryptoContext::pow`] applied to the generator.
    pub fn pow_g(&self, exp: &Scalar) -> GroupElement {
        self.pow(&self.g, exp)
    }

    /// The multiplicative inverse of `a` mod `p`, via Fermat's little theorem
    /// (`a^(p-2) mod p`), valid for any non-zero `a`.
    pub fn inverse(&self, a: &GroupElement) -> Result<GroupElement, GroupError> {
        if a.0.is_zero() {
            return Err(GroupError::NotInvertible);
        }
        let exp = &self.p - BigUint::from(2u8);
        Ok(GroupElement::from_reduced(a.0.modpow(&exp, &self.p)))
    }

    /// `a == b` by canonical integer representation.
    pub fn equals(&self, a: &GroupElement, b: &GroupElement) -> bool {
        a == b
    }

    /// Encodes a group element as fixed-width big-endian bytes, zero-padded
    /// on the left to [`CryptoContext::encoded_len`].
    pub fn encode(&self, a: &GroupElement) -> Vec<u8> {
        let raw = a.0.to_bytes_be();
        let mut out = vec![0u8; self.encoded_len - raw.len()];
        out.extend_from_slice(&raw);
        out
    }

    /// Decodes a fixed-width big-endian byte string into a group element.
    ///
    /// Rejects the wrong length and values `>= p`.
    pub fn decode(&self, bytes: &[u8]) -> Result<GroupElement, GroupError> {
        if bytes.len() != self.encoded_len {
            return Err(GroupError::WrongLength {
                expected: self.encoded_len,
                got: bytes.len(),
            });
        }
        let value = BigUint::from_bytes_be(bytes);
        if value >= self.p {
            return Err(GroupError::NotCanonical);
        }
        Ok(GroupElement::from_reduced(value))
    }

    /// Encodes a scalar as fixed-width big-endian bytes (same width as group
    /// elements; `q < p` so this never overflows the field).
    pub fn encode_scalar(&self, s: &Scalar) -> Vec<u8> {
        let raw = s.0.to_bytes_be();
        let mut out = vec![0u8; self.encoded_len - raw.len()];
        out.extend_from_slice(&raw);
        out
    }

    /// Decodes a fixed-width big-endian byte string into a scalar, rejecting
    /// values `>= q`.
    pub fn decode_scalar(&self, bytes: &[u8]) -> Result<Scalar, GroupError> {
        if bytes.len() != self.encoded_len {
            return Err(GroupError::WrongLength {
                expected: self.encoded_len,
                got: bytes.len(),
            });
        }
        let value = BigUint::from_bytes_be(bytes);
        if value >= self.q {
            return Err(GroupError::ScalarNotCanonical);
        }
        Ok(Scalar::from_reduced(value))
    }

    /// Encodes a group element as standard base64 over its canonical
    /// fixed-width big-endian bytes.
    pub fn encode_b64(&self, a: &GroupElement) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(self.encode(a))
    }

    /// Decodes a base64-encoded group element (inverse of [`Self::encode_b64`]).
    pub fn decode_b64(&self, s: &str) -> Result<GroupElement, GroupError> {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| GroupError::InvalidEncoding)?;
        self.decode(&bytes)
    }

    /// Encodes a scalar as standard base64 over its canonical fixed-width
    /// big-endian bytes.
    pub fn encode_scalar_b64(&self, s: &Scalar) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(self.encode_scalar(s))
    }

    /// Decodes a base64-encoded scalar (inverse of [`Self::encode_scalar_b64`]).
    pub fn decode_scalar_b64(&self, s: &str) -> Result<Scalar, GroupError> {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| GroupError::InvalidEncoding)?;
        self.decode_scalar(&bytes)
    }

    /// `a + b mod q`.
    pub fn add_scalars(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar::from_reduced((&a.0 + &b.0) % &self.q)
    }

    /// `a * b mod q`.
    pub fn mul_scalars(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar::from_reduced((&a.0 * &b.0) % &self.q)
    }

    /// Reduces an arbitrary non-negative integer mod `q` into a [`Scalar`].
    ///
    /// Used to fold wide hash output (Fiat–Shamir challenges) into `Z_q`.
    pub fn scalar_from_biguint_mod_q(&self, value: BigUint) -> Scalar {
        Scalar::from_reduced(value % &self.q)
    }

    /// Samples a uniformly random scalar in `[1, q)`.
    pub fn random_scalar<R: Rng + CryptoRng>(&self, rng: &mut R) -> Scalar {
        use num_bigint::RandBigInt;
        loop {
            let candidate = rng.gen_biguint_below(&self.q);
            if !candidate.is_zero() {
                return Scalar::from_reduced(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_ctx() -> CryptoContext {
        // p = 23 = 2*11 + 1, q = 11, g = 4 generates the order-11 subgroup.
        CryptoContext::new(BigUint::from(23u32), BigUint::from(4u32)).unwrap()
    }

    #[test]
    fn pow_and_inverse_roundtrip() {
        let ctx = small_ctx();
        let mut rng = rand::thread_rng();
        let x = ctx.random_scalar(&mut rng);
        let y = ctx.pow_g(&x);
        let y_inv = ctx.inverse(&y).unwrap();
        assert_eq!(ctx.mul(&y, &y_inv), ctx.identity());
    }

    #[test]
    fn encode_decode_roundtrip() {
        let ctx = small_ctx();
        let g = ctx.generator();
        let bytes = ctx.encode(&g);
        assert_eq!(bytes.len(), ctx.encoded_len());
        let decoded = ctx.decode(&bytes).unwrap();
        assert_eq!(decoded, g);
    }

    #[test]
    fn decode_rejects_out_of_range() {
        let ctx = small_ctx();
        let bytes = ctx.p().to_bytes_be();
        assert_eq!(ctx.decode(&bytes), Err(GroupError::NotCanonical));
    }

    #[test]
    fn mul_is_commutative_and_matches_pow() {
        let ctx = small_ctx();
        let mut rng = rand::thread_rng();
        let a = ctx.random_scalar(&mut rng);
        let b = ctx.random_scalar(&mut rng);
        let ga = ctx.pow_g(&a);
        let gb = ctx.pow_g(&b);
        let sum = ctx.add_scalars(&a, &b);
        assert_eq!(ctx.mul(&ga, &gb), ctx.pow_g(&sum));
        assert_eq!(ctx.mul(&ga, &gb), ctx.mul(&gb, &ga));
    }
}
