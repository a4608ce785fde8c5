//! Partial decryption shares and their verification.
//!
//! Shares only ever enter an aggregation set after the attached
//! Chaum-Pedersen proof checked out, so everything downstream of
//! verification works with plain group elements.

use ark_ec::CurveGroup;
use quorate_crypto::GuardianIndex;
use quorate_crypto::cp_proof::{ChaumPedersen, CpParameters, DleqTuple, Proof};
use quorate_crypto::elgamal::Ciphertext;
use quorate_crypto::keys::GuardianPublicRecord;
use quorate_crypto::serde_bridge::SerdeAs;
use quorate_crypto::traits::dleq_proof::{DleqProofError, DleqProofScheme};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sha2::Sha256;

use crate::error::DecryptionError;
use crate::tally::CiphertextId;

/// A guardian's own partial decryption `M_i = pad^{z_i}` of one
/// ciphertext, with proof that the exponent matches its public key share.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DecryptionShare<C: CurveGroup> {
    guardian: GuardianIndex,
    ciphertext: CiphertextId,
    #[serde_as(as = "SerdeAs")]
    partial: C,
    proof: Proof<C>,
}

impl<C: CurveGroup> DecryptionShare<C> {
    pub(crate) fn new(
        guardian: GuardianIndex,
        ciphertext: CiphertextId,
        partial: C,
        proof: Proof<C>,
    ) -> Self {
        DecryptionShare {
            guardian,
            ciphertext,
            partial,
            proof,
        }
    }

    pub fn guardian(&self) -> GuardianIndex {
        self.guardian
    }

    pub fn ciphertext_id(&self) -> &CiphertextId {
        &self.ciphertext
    }

    pub fn partial(&self) -> C {
        self.partial
    }

    /// Check the proof against the guardian's public key share.
    pub fn verify(
        &self,
        pp: &CpParameters<C, Sha256>,
        record: &GuardianPublicRecord<C>,
        ciphertext: &Ciphertext<C>,
    ) -> Result<(), DecryptionError> {
        let tuple = DleqTuple::new(
            pp.generator,
            record.public_key(),
            ciphertext.pad(),
            self.partial,
        );
        match ChaumPedersen::verify(pp, tuple, &self.proof) {
            Ok(()) => Ok(()),
            Err(DleqProofError::ProofNotValid) => Err(DecryptionError::InvalidProof {
                guardian: self.guardian,
                ciphertext: self.ciphertext.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// A partial decryption computed by `guardian` on behalf of the absent
/// `missing` guardian, using the backup `Q_missing(guardian)`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CompensatedDecryptionShare<C: CurveGroup> {
    guardian: GuardianIndex,
    missing: GuardianIndex,
    ciphertext: CiphertextId,
    #[serde_as(as = "SerdeAs")]
    partial: C,
    proof: Proof<C>,
}

impl<C: CurveGroup> CompensatedDecryptionShare<C> {
    pub(crate) fn new(
        guardian: GuardianIndex,
        missing: GuardianIndex,
        ciphertext: CiphertextId,
        partial: C,
        proof: Proof<C>,
    ) -> Self {
        CompensatedDecryptionShare {
            guardian,
            missing,
            ciphertext,
            partial,
            proof,
        }
    }

    pub fn guardian(&self) -> GuardianIndex {
        self.guardian
    }

    pub fn missing(&self) -> GuardianIndex {
        self.missing
    }

    pub fn ciphertext_id(&self) -> &CiphertextId {
        &self.ciphertext
    }

    pub fn partial(&self) -> C {
        self.partial
    }

    /// Check the proof against the *missing* guardian's published backup
    /// commitment: the statement base `g^{Q_missing(guardian)}` is derived
    /// from the commitment alone, without the missing guardian.
    pub fn verify(
        &self,
        pp: &CpParameters<C, Sha256>,
        missing_record: &GuardianPublicRecord<C>,
        ciphertext: &Ciphertext<C>,
    ) -> Result<(), DecryptionError> {
        let backup_image = missing_record.backup_public_eval(self.guardian)?;
        let tuple = DleqTuple::new(pp.generator, backup_image, ciphertext.pad(), self.partial);
        match ChaumPedersen::verify(pp, tuple, &self.proof) {
            Ok(()) => Ok(()),
            Err(DleqProofError::ProofNotValid) => Err(DecryptionError::InvalidProof {
                guardian: self.guardian,
                ciphertext: self.ciphertext.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
