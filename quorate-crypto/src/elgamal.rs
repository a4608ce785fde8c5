//! Exponential ElGamal over a prime-order group.
//!
//! A vote indicator `m` is encrypted as `(pad, data) = (g^r, g^m * K^r)`.
//! Encrypting the exponent keeps the scheme additively homomorphic, so
//! selection ciphertexts aggregate into tally ciphertexts by pairwise
//! multiplication. Decryption recovers `g^m` and then searches the small
//! counter domain for `m`; the bound is an election parameter, not a
//! general discrete-log solver.

use ark_ec::CurveGroup;
use ark_ff::Zero;
use ark_std::UniformRand;
use ark_std::rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::iter::Sum;
use std::ops::Add;
use thiserror::Error;

use crate::keys::JointPublicKey;
use crate::serde_bridge::SerdeAs;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElGamalError {
    #[error("no count in [0, {bound}] matches the decryption")]
    CountOutOfRange { bound: u64 },
}

/// Immutable ElGamal pair. `pad = g^r`, `data = g^m * K^r`.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext<C: CurveGroup> {
    #[serde_as(as = "SerdeAs")]
    pad: C,
    #[serde_as(as = "SerdeAs")]
    data: C,
}

impl<C: CurveGroup> Ciphertext<C> {
    pub fn new(pad: C, data: C) -> Self {
        Ciphertext { pad, data }
    }

    /// The neutral ciphertext, encrypting zero with zero randomness.
    pub fn zero() -> Self {
        Ciphertext {
            pad: C::zero(),
            data: C::zero(),
        }
    }

    pub fn pad(&self) -> C {
        self.pad
    }

    pub fn data(&self) -> C {
        self.data
    }

    /// Decrypt against the full secret, searching counts up to `bound`.
    pub fn decrypt_with_secret(
        &self,
        secret: &C::ScalarField,
        bound: u64,
    ) -> Result<u64, ElGamalError> {
        let blinding = self.pad * secret;
        discrete_log(self.data - blinding, bound)
            .ok_or(ElGamalError::CountOutOfRange { bound })
    }
}

impl<C: CurveGroup> Add for Ciphertext<C> {
    type Output = Ciphertext<C>;

    fn add(self, rhs: Ciphertext<C>) -> Ciphertext<C> {
        Ciphertext {
            pad: self.pad + rhs.pad,
            data: self.data + rhs.data,
        }
    }
}

impl<C: CurveGroup> Sum for Ciphertext<C> {
    fn sum<I: Iterator<Item = Ciphertext<C>>>(iter: I) -> Self {
        iter.fold(Ciphertext::zero(), Add::add)
    }
}

/// Encrypt a counter under the joint public key with fresh randomness.
pub fn encrypt<C: CurveGroup, R: Rng>(
    public_key: &JointPublicKey<C>,
    count: u64,
    rng: &mut R,
) -> Ciphertext<C> {
    let g = C::generator();
    let r = C::ScalarField::rand(rng);
    Ciphertext {
        pad: g * r,
        data: g * C::ScalarField::from(count) + public_key.element() * r,
    }
}

/// Bounded linear search for `m` with `g^m == target`.
///
/// The counter domain of a selection is small and fixed by the election
/// configuration, so a plain scan beats any general-purpose solver.
pub fn discrete_log<C: CurveGroup>(target: C, bound: u64) -> Option<u64> {
    let g = C::generator();
    let mut acc = C::zero();
    for m in 0..=bound {
        if acc == target {
            return Some(m);
        }
        acc += g;
    }
    None
}
