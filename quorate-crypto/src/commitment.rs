//! Feldman-style polynomial commitments.
//!
//! A guardian publishes `(g^{q_0}, ..., g^{q_{k-1}})` for its backup
//! polynomial `Q`. Anyone can then evaluate `g^{Q(x)}` without the
//! coefficients, which is what makes backup shares and compensated
//! decryption shares publicly verifiable.

use ark_ec::CurveGroup;
use ark_ff::One;
use ark_poly::univariate::DensePolynomial;
use std::iter::successors;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    #[error("empty commitment")]
    Empty,
    #[error("msm over commitment failed")]
    Msm,
}

/// Commit to all coefficients of `poly`: `u_j = g^{q_j}`.
pub fn commit<C: CurveGroup>(poly: &DensePolynomial<C::ScalarField>) -> Vec<C::Affine> {
    C::generator().batch_mul(&poly.coeffs)
}

/// Evaluate the committed polynomial in the exponent:
/// `g^Q(x) = Prod_{j} u_j^{x^j}`.
pub fn public_eval<C: CurveGroup>(
    commitment: &[C::Affine],
    point: C::ScalarField,
) -> Result<C, CommitmentError> {
    if commitment.is_empty() {
        return Err(CommitmentError::Empty);
    }
    let powers = successors(Some(C::ScalarField::one()), |prev| Some(*prev * point))
        .take(commitment.len())
        .collect::<Vec<_>>();
    C::msm(commitment, &powers).map_err(|_| CommitmentError::Msm)
}

/// Check a secret evaluation against the commitment: `g^share == g^Q(point)`.
pub fn verify_eval<C: CurveGroup>(
    commitment: &[C::Affine],
    point: C::ScalarField,
    share: &C::ScalarField,
) -> Result<bool, CommitmentError> {
    Ok(C::generator() * share == public_eval::<C>(commitment, point)?)
}
