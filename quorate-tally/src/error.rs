use quorate_crypto::GuardianIndex;
use quorate_crypto::commitment::CommitmentError;
use quorate_crypto::interpolation::InterpolationError;
use quorate_crypto::keys::CeremonyError;
use quorate_crypto::traits::dleq_proof::DleqProofError;
use thiserror::Error;

use crate::tally::CiphertextId;

/// The error type for a decryption session. Decryption is all-or-nothing:
/// the first terminal error aborts the session and no partial tally is
/// ever returned.
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("{present} guardians present, quorum is {quorum}")]
    InsufficientGuardians { present: usize, quorum: usize },
    #[error("{guardian} holds no backup for {missing}")]
    MissingBackup {
        guardian: GuardianIndex,
        missing: GuardianIndex,
    },
    #[error("invalid proof from {guardian} for {ciphertext}")]
    InvalidProof {
        guardian: GuardianIndex,
        ciphertext: CiphertextId,
    },
    #[error("duplicate share from {guardian} for {ciphertext}")]
    DuplicateShare {
        guardian: GuardianIndex,
        ciphertext: CiphertextId,
    },
    #[error("no vote count within the configured bound for {ciphertext}")]
    DecryptionFailed { ciphertext: CiphertextId },
    #[error("{0} is not a guardian of this ceremony")]
    UnknownGuardian(GuardianIndex),
    #[error("{0} announced more than once")]
    DuplicateGuardian(GuardianIndex),
    #[error("ciphertext {0} appears more than once in the session")]
    DuplicateCiphertext(CiphertextId),
    #[error("share set for {ciphertext} is incomplete")]
    SharesIncomplete { ciphertext: CiphertextId },
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
    #[error(transparent)]
    Ceremony(#[from] CeremonyError),
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
    #[error(transparent)]
    Dleq(#[from] DleqProofError),
}
