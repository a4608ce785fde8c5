//! Key-ceremony output consumed by threshold decryption.
//!
//! The interactive ceremony itself happens elsewhere; this module models
//! what it hands over. Guardian `i` ends up with the joint polynomial
//! evaluation `z_i = P(i)` as its secret share, and reshares that value
//! with its own backup polynomial `Q_i` (`Q_i(0) = z_i`): every other
//! guardian `l` holds the backup `Q_i(l)`, and the commitment to `Q_i`
//! is public. Any quorum of backup holders can therefore stand in for an
//! absent guardian, verifiably.
//!
//! [`trusted_key_ceremony`] produces the same output from a single
//! trusted dealer, for tests and single-process deployments.

use ark_ec::CurveGroup;
use ark_ff::Zero;
use ark_poly::{DenseUVPolynomial, Polynomial, univariate::DensePolynomial};
use ark_std::rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::num::NonZeroU32;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::GuardianIndex;
use crate::commitment::{self, CommitmentError};
use crate::serde_bridge::SerdeAs;

/// Fixed parameters of one ceremony: how many guardians exist and how
/// many of them must cooperate to decrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyConfig {
    guardians: NonZeroU32,
    quorum: NonZeroU32,
}

impl CeremonyConfig {
    pub fn new(guardians: NonZeroU32, quorum: NonZeroU32) -> Result<Self, CeremonyError> {
        if quorum > guardians {
            return Err(CeremonyError::QuorumTooLarge {
                quorum: quorum.get(),
                guardians: guardians.get(),
            });
        }
        Ok(CeremonyConfig { guardians, quorum })
    }

    pub fn guardians(&self) -> NonZeroU32 {
        self.guardians
    }

    pub fn quorum(&self) -> NonZeroU32 {
        self.quorum
    }

    /// All guardian indices, `1..=n`.
    pub fn indices(&self) -> impl Iterator<Item = GuardianIndex> {
        let n = self.guardians.get();
        (1..=n).map(|i| GuardianIndex::new(i).expect("indices start at 1"))
    }
}

/// The election public key `K = g^{P(0)}` everything is encrypted under.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointPublicKey<C: CurveGroup> {
    #[serde_as(as = "SerdeAs")]
    key: C,
}

impl<C: CurveGroup> JointPublicKey<C> {
    pub fn new(key: C) -> Self {
        JointPublicKey { key }
    }

    pub fn element(&self) -> C {
        self.key
    }
}

/// Published ceremony output for one guardian: its public key share
/// `K_i = g^{z_i}` and the commitment to its backup polynomial `Q_i`.
///
/// `backup_commitment[0]` commits to `Q_i(0) = z_i` and thus equals the
/// public key share.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianPublicRecord<C: CurveGroup> {
    index: GuardianIndex,
    #[serde_as(as = "SerdeAs")]
    public_key: C,
    #[serde_as(as = "Vec<SerdeAs>")]
    backup_commitment: Vec<C::Affine>,
}

impl<C: CurveGroup> GuardianPublicRecord<C> {
    pub fn new(index: GuardianIndex, public_key: C, backup_commitment: Vec<C::Affine>) -> Self {
        GuardianPublicRecord {
            index,
            public_key,
            backup_commitment,
        }
    }

    pub fn index(&self) -> GuardianIndex {
        self.index
    }

    pub fn public_key(&self) -> C {
        self.public_key
    }

    pub fn backup_commitment(&self) -> &[C::Affine] {
        &self.backup_commitment
    }

    /// `g^{Q_i(holder)}`: the public image of the backup this guardian
    /// issued to `holder`.
    pub fn backup_public_eval(&self, holder: GuardianIndex) -> Result<C, CommitmentError> {
        commitment::public_eval::<C>(&self.backup_commitment, holder.to_scalar())
    }

    /// Check a backup scalar against this record's commitment.
    pub fn verify_backup(
        &self,
        holder: GuardianIndex,
        share: &C::ScalarField,
    ) -> Result<bool, CommitmentError> {
        commitment::verify_eval::<C>(&self.backup_commitment, holder.to_scalar(), share)
    }

    /// Structural sanity of a published record.
    pub fn validate(&self, config: &CeremonyConfig) -> Result<(), CeremonyError> {
        if self.backup_commitment.len() != config.quorum().get() as usize
            || self.backup_commitment[0] != self.public_key.into_affine()
        {
            return Err(CeremonyError::MalformedRecord(self.index));
        }
        Ok(())
    }
}

/// One backup a guardian holds on behalf of another: `Q_issuer(holder)`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BackupShare<C: CurveGroup> {
    #[zeroize(skip)]
    issuer: GuardianIndex,
    share: C::ScalarField,
}

impl<C: CurveGroup> BackupShare<C> {
    pub fn new(issuer: GuardianIndex, share: C::ScalarField) -> Self {
        BackupShare { issuer, share }
    }

    pub fn issuer(&self) -> GuardianIndex {
        self.issuer
    }

    pub fn share(&self) -> &C::ScalarField {
        &self.share
    }
}

/// Everything one guardian exclusively owns after the ceremony.
///
/// Deliberately neither `Clone` nor `Serialize`: the secret share and the
/// backups stay inside the guardian boundary and are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct GuardianKeyMaterial<C: CurveGroup> {
    #[zeroize(skip)]
    index: GuardianIndex,
    secret: C::ScalarField,
    backups: Vec<BackupShare<C>>,
}

impl<C: CurveGroup> GuardianKeyMaterial<C> {
    pub fn new(index: GuardianIndex, secret: C::ScalarField, backups: Vec<BackupShare<C>>) -> Self {
        GuardianKeyMaterial {
            index,
            secret,
            backups,
        }
    }

    pub fn index(&self) -> GuardianIndex {
        self.index
    }

    pub fn secret(&self) -> &C::ScalarField {
        &self.secret
    }

    pub fn backups(&self) -> impl Iterator<Item = &BackupShare<C>> {
        self.backups.iter()
    }

    /// The backup held for `issuer`, if this guardian received one.
    pub fn backup_for(&self, issuer: GuardianIndex) -> Option<&C::ScalarField> {
        self.backups
            .iter()
            .find(|b| b.issuer == issuer)
            .map(|b| &b.share)
    }
}

/// Full ceremony output: one public part, one secret part per guardian.
pub struct CeremonyOutput<C: CurveGroup> {
    pub config: CeremonyConfig,
    pub joint_key: JointPublicKey<C>,
    pub records: Vec<GuardianPublicRecord<C>>,
    pub key_materials: Vec<GuardianKeyMaterial<C>>,
}

/// Single-dealer stand-in for the interactive key ceremony.
///
/// Samples the joint polynomial `P` of degree `quorum - 1`, hands
/// guardian `i` the share `z_i = P(i)`, and reshares each `z_i` over a
/// fresh backup polynomial for the compensation path.
pub fn trusted_key_ceremony<C: CurveGroup, R: Rng>(
    config: CeremonyConfig,
    rng: &mut R,
) -> CeremonyOutput<C> {
    let k = config.quorum().get() as usize;
    let g = C::generator();

    let joint_poly = DensePolynomial::<C::ScalarField>::rand(k - 1, rng);
    let joint_key = JointPublicKey::new(g * joint_poly.evaluate(&C::ScalarField::zero()));

    let secrets: Vec<C::ScalarField> = config
        .indices()
        .map(|i| joint_poly.evaluate(&i.to_scalar()))
        .collect();

    // reshare each z_i: Q_i random of degree k-1 with Q_i(0) = z_i
    let backup_polys: Vec<DensePolynomial<C::ScalarField>> = secrets
        .iter()
        .map(|z| {
            let mut poly = DensePolynomial::rand(k - 1, rng);
            poly.coeffs[0] = *z;
            poly
        })
        .collect();
    let commitments: Vec<Vec<C::Affine>> = backup_polys
        .par_iter()
        .map(|q| commitment::commit::<C>(q))
        .collect();

    let records = config
        .indices()
        .zip(secrets.iter().zip(commitments))
        .map(|(i, (z, comm))| GuardianPublicRecord::new(i, g * z, comm))
        .collect();

    let key_materials = config
        .indices()
        .zip(secrets.iter())
        .map(|(holder, z)| {
            let backups = config
                .indices()
                .filter(|issuer| *issuer != holder)
                .map(|issuer| {
                    let q = &backup_polys[(issuer.get() - 1) as usize];
                    BackupShare::new(issuer, q.evaluate(&holder.to_scalar()))
                })
                .collect();
            GuardianKeyMaterial::new(holder, *z, backups)
        })
        .collect();

    CeremonyOutput {
        config,
        joint_key,
        records,
        key_materials,
    }
}

/// The error type for ceremony output validation.
#[derive(Debug, Error)]
pub enum CeremonyError {
    #[error("quorum {quorum} exceeds guardian count {guardians}")]
    QuorumTooLarge { quorum: u32, guardians: u32 },
    #[error("{0} published a malformed record")]
    MalformedRecord(GuardianIndex),
    #[error("backup issued by {issuer} and held by {holder} fails its commitment")]
    InvalidBackup {
        issuer: GuardianIndex,
        holder: GuardianIndex,
    },
    #[error("no public record for {0}")]
    MissingRecord(GuardianIndex),
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::{interpolate_in_exponent, lagrange_coefficients_at_zero};
    use ark_bls12_381::G1Projective;
    use ark_ec::PrimeGroup;
    use ark_std::test_rng;

    fn config(n: u32, k: u32) -> CeremonyConfig {
        CeremonyConfig::new(
            NonZeroU32::new(n).unwrap(),
            NonZeroU32::new(k).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_quorum_bounds() {
        assert!(
            CeremonyConfig::new(NonZeroU32::new(2).unwrap(), NonZeroU32::new(3).unwrap()).is_err()
        );
    }

    #[test]
    fn test_ceremony_records_are_consistent() {
        let rng = &mut test_rng();
        let out = trusted_key_ceremony::<G1Projective, _>(config(4, 3), rng);

        for (record, keys) in out.records.iter().zip(&out.key_materials) {
            record.validate(&out.config).unwrap();
            assert_eq!(record.index(), keys.index());
            assert_eq!(
                record.public_key(),
                G1Projective::generator() * keys.secret()
            );
        }
    }

    #[test]
    fn test_all_backups_verify() {
        let rng = &mut test_rng();
        let out = trusted_key_ceremony::<G1Projective, _>(config(4, 2), rng);

        for keys in &out.key_materials {
            for backup in keys.backups() {
                let record = &out.records[(backup.issuer().get() - 1) as usize];
                assert!(record.verify_backup(keys.index(), backup.share()).unwrap());
            }
        }
    }

    #[test]
    fn test_joint_key_interpolates_from_any_quorum() {
        let rng = &mut test_rng();
        let out = trusted_key_ceremony::<G1Projective, _>(config(3, 2), rng);

        for subset in [[1u32, 2], [1, 3], [2, 3]] {
            let points: Vec<_> = subset
                .iter()
                .map(|i| GuardianIndex::new(*i).unwrap().to_scalar())
                .collect();
            let evals: Vec<_> = subset
                .iter()
                .map(|i| out.records[(*i - 1) as usize].public_key().into_affine())
                .collect();
            let k = interpolate_in_exponent::<G1Projective>(&points, &evals).unwrap();
            assert_eq!(k, out.joint_key.element());
        }
    }

    #[test]
    fn test_weighted_secret_sum_matches_joint_key() {
        let rng = &mut test_rng();
        let out = trusted_key_ceremony::<G1Projective, _>(config(3, 2), rng);

        let points: Vec<_> = [1u32, 2]
            .iter()
            .map(|i| GuardianIndex::new(*i).unwrap().to_scalar())
            .collect();
        let coeffs = lagrange_coefficients_at_zero(&points).unwrap();
        let secret = coeffs[0] * out.key_materials[0].secret()
            + coeffs[1] * out.key_materials[1].secret();
        assert_eq!(
            G1Projective::generator() * secret,
            out.joint_key.element()
        );
    }
}
