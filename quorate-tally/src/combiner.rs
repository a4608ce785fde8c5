//! Combination of partial decryptions into plaintext counts.

use ark_ec::CurveGroup;
use ark_ff::PrimeField;
use quorate_crypto::GuardianIndex;
use quorate_crypto::elgamal::{self, Ciphertext};
use quorate_crypto::interpolation::{InterpolationError, lagrange_coefficients_at_zero};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::DecryptionError;
use crate::tally::CiphertextId;

/// Interpolation weights at zero for one fixed set of contributing
/// guardian indices. Weights computed for one set must never be reused
/// for another; [`weighted_combine`] enforces the match.
#[derive(Debug, Clone)]
pub struct LagrangeCoefficients<F: PrimeField> {
    weights: BTreeMap<GuardianIndex, F>,
}

impl<F: PrimeField> LagrangeCoefficients<F> {
    /// Compute `w_i = prod_{j != i} j / (j - i)` for every index in the
    /// set. Deterministic; fails on colliding indices.
    pub fn compute(indices: &BTreeSet<GuardianIndex>) -> Result<Self, InterpolationError> {
        let points: Vec<F> = indices.iter().map(|i| i.to_scalar()).collect();
        let coeffs = lagrange_coefficients_at_zero(&points)?;
        Ok(LagrangeCoefficients {
            weights: indices.iter().copied().zip(coeffs).collect(),
        })
    }

    pub fn weight(&self, index: GuardianIndex) -> Option<&F> {
        self.weights.get(&index)
    }

    pub fn indices(&self) -> impl Iterator<Item = GuardianIndex> {
        self.weights.keys().copied()
    }
}

/// `prod_i M_i^{w_i}` over exactly the coefficient index set.
pub fn weighted_combine<C: CurveGroup>(
    partials: &BTreeMap<GuardianIndex, C>,
    coefficients: &LagrangeCoefficients<C::ScalarField>,
) -> Result<C, DecryptionError> {
    if partials.len() != coefficients.weights.len()
        || !partials.keys().eq(coefficients.weights.keys())
    {
        return Err(InterpolationError::MismatchedLengths {
            points: coefficients.weights.len(),
            evals: partials.len(),
        }
        .into());
    }
    // both maps iterate in index order, so entries line up
    let bases = C::normalize_batch(&partials.values().copied().collect::<Vec<_>>());
    let scalars: Vec<_> = coefficients.weights.values().copied().collect();
    C::msm(&bases, &scalars).map_err(|_| InterpolationError::Msm.into())
}

/// Recover the vote count of one selection from its verified partials.
///
/// Computes `T = data * combined^{-1}` and searches `m` in
/// `[0, max_votes]` for `g^m = T`. The bound is the election's
/// per-selection vote limit; exceeding it means corrupt inputs.
pub fn combine<C: CurveGroup>(
    ciphertext_id: &CiphertextId,
    ciphertext: &Ciphertext<C>,
    partials: &BTreeMap<GuardianIndex, C>,
    coefficients: &LagrangeCoefficients<C::ScalarField>,
    max_votes: u64,
) -> Result<u64, DecryptionError> {
    let combined = weighted_combine(partials, coefficients)?;
    elgamal::discrete_log(ciphertext.data() - combined, max_votes).ok_or(
        DecryptionError::DecryptionFailed {
            ciphertext: ciphertext_id.clone(),
        },
    )
}

/// Rebuild an absent guardian's partial decryption `M_m = pad^{z_m}` from
/// the compensated partials `pad^{Q_m(l)}` of its backup holders.
pub fn reconstruct_partial<C: CurveGroup>(
    compensated: &BTreeMap<GuardianIndex, C>,
    coefficients: &LagrangeCoefficients<C::ScalarField>,
) -> Result<C, DecryptionError> {
    weighted_combine(compensated, coefficients)
}
