pub mod commitment;
pub mod cp_proof;
pub mod elgamal;
pub mod interpolation;
pub mod keys;
pub mod prelude;
pub mod serde_bridge;
pub mod traits;

use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// One-based position of a guardian in the ceremony roster.
///
/// The index doubles as the guardian's evaluation point in the secret
/// sharing polynomials, so it is never zero (the joint secret lives at
/// zero).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Zeroize,
)]
pub struct GuardianIndex(u32);

impl GuardianIndex {
    pub fn new(index: u32) -> Option<Self> {
        (index > 0).then_some(GuardianIndex(index))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// The evaluation point `x = i` in the scalar field.
    pub fn to_scalar<F: PrimeField>(&self) -> F {
        F::from(u64::from(self.0))
    }
}

impl fmt::Display for GuardianIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guardian-{}", self.0)
    }
}

impl TryFrom<u32> for GuardianIndex {
    type Error = InvalidGuardianIndex;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        GuardianIndex::new(value).ok_or(InvalidGuardianIndex(()))
    }
}

impl From<GuardianIndex> for u32 {
    fn from(value: GuardianIndex) -> Self {
        value.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("guardian index must be positive")]
pub struct InvalidGuardianIndex(());
