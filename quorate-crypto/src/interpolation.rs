//! Lagrange interpolation at zero, in the base field or in the exponent.
//!
//! Reconstruction of a shared secret (or of a partial decryption computed
//! under it) evaluates the sharing polynomial at zero from a subset of
//! points. Interpolating in the exponent follows BonehShoup Sec 22.1.1.

use ark_ec::CurveGroup;
use ark_ff::{Field, batch_inversion};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("no evaluation points")]
    Empty,
    #[error("mismatched input lengths: {points} points, {evals} evaluations")]
    MismatchedLengths { points: usize, evals: usize },
    #[error("degenerate evaluation points: duplicate or zero")]
    Degenerate,
    #[error("msm over evaluation points failed")]
    Msm,
}

/// Lagrange basis polynomials for `eval_points`, evaluated at zero.
///
/// Coefficients are returned in input order. Points must be pairwise
/// distinct and non-zero (zero is the reconstruction target itself);
/// colliding points would put a zero denominator into the basis.
pub fn lagrange_coefficients_at_zero<F: Field>(
    eval_points: &[F],
) -> Result<Vec<F>, InterpolationError> {
    let n = eval_points.len();
    if n == 0 {
        return Err(InterpolationError::Empty);
    }
    for (i, x_i) in eval_points.iter().enumerate() {
        if x_i.is_zero() || eval_points[..i].contains(x_i) {
            return Err(InterpolationError::Degenerate);
        }
    }

    let mut w = vec![F::one(); n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                w[i] *= eval_points[i] - eval_points[j];
            }
        }
    }
    batch_inversion(&mut w);
    let l0 = eval_points.iter().fold(F::one(), |acc, x_i| acc * (-*x_i));
    Ok(eval_points
        .iter()
        .zip(w.iter())
        .map(|(x_i, w_i)| l0 * w_i / (-*x_i))
        .collect())
}

/// Given evaluated points {x_i} and evaluations {y_i = f(x_i)}, return f(0).
/// Polynomial degree <= eval_points.len() - 1.
pub fn interpolate<C: CurveGroup>(
    eval_points: &[C::ScalarField],
    evals: &[C::ScalarField],
) -> Result<C::ScalarField, InterpolationError> {
    if eval_points.len() != evals.len() {
        return Err(InterpolationError::MismatchedLengths {
            points: eval_points.len(),
            evals: evals.len(),
        });
    }
    let lagrange_coeffs = lagrange_coefficients_at_zero(eval_points)?;
    Ok(lagrange_coeffs
        .iter()
        .zip(evals)
        .map(|(l, y)| *l * *y)
        .sum())
}

/// Given evaluated points {x_i} and evaluations in the exponent {g^y_i},
/// returns g^f(0). Corollary 22.2 of BonehShoup.
pub fn interpolate_in_exponent<C: CurveGroup>(
    eval_points: &[C::ScalarField],
    evals_in_exp: &[C::Affine],
) -> Result<C, InterpolationError> {
    if eval_points.len() != evals_in_exp.len() {
        return Err(InterpolationError::MismatchedLengths {
            points: eval_points.len(),
            evals: evals_in_exp.len(),
        });
    }
    let lagrange_coeffs = lagrange_coefficients_at_zero(eval_points)?;
    C::msm(evals_in_exp, &lagrange_coeffs).map_err(|_| InterpolationError::Msm)
}
