use ark_std::rand::Rng;
use thiserror::Error;

pub trait DleqProofScheme {
    type Parameters;
    type DleqTuple;
    type Scalar;
    type Proof;

    fn prove<R: Rng>(
        pp: &Self::Parameters,
        rng: &mut R,
        tuple: Self::DleqTuple,
        x: &Self::Scalar,
    ) -> Result<Self::Proof, DleqProofError>;

    fn verify(
        pp: &Self::Parameters,
        tuple: Self::DleqTuple,
        proof: &Self::Proof,
    ) -> Result<(), DleqProofError>;
}

/// The error type for `DleqProofScheme` methods.
#[derive(Error, Debug)]
pub enum DleqProofError {
    #[error("Invalid argument: {0}")]
    Argument(String),
    #[error("Invalid proof")]
    ProofNotValid,
    #[error("Internal Error: {0}")]
    Internal(anyhow::Error),
}
