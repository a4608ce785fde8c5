//! A guardian: sole owner of one secret key share.
//!
//! Only derived public values leave this type: partial decryptions and
//! their proofs. The secret share and the held backups stay inside the
//! wrapped [`GuardianKeyMaterial`] and are wiped when it drops.

use ark_ec::CurveGroup;
use ark_std::rand::Rng;
use quorate_crypto::GuardianIndex;
use quorate_crypto::cp_proof::{ChaumPedersen, CpParameters, DleqTuple};
use quorate_crypto::elgamal::Ciphertext;
use quorate_crypto::keys::{CeremonyError, GuardianKeyMaterial, GuardianPublicRecord};
use quorate_crypto::traits::dleq_proof::DleqProofScheme;
use sha2::Sha256;

use crate::error::DecryptionError;
use crate::share::{CompensatedDecryptionShare, DecryptionShare};
use crate::tally::CiphertextId;

pub struct Guardian<C: CurveGroup> {
    keys: GuardianKeyMaterial<C>,
}

impl<C: CurveGroup> Guardian<C> {
    /// Take ownership of ceremony output, verifying every held backup
    /// against its issuer's published commitment. Corrupt ceremony output
    /// is rejected here, before any decryption session starts.
    pub fn new(
        keys: GuardianKeyMaterial<C>,
        records: &[GuardianPublicRecord<C>],
    ) -> Result<Self, CeremonyError> {
        for backup in keys.backups() {
            let record = records
                .iter()
                .find(|r| r.index() == backup.issuer())
                .ok_or(CeremonyError::MissingRecord(backup.issuer()))?;
            if !record.verify_backup(keys.index(), backup.share())? {
                return Err(CeremonyError::InvalidBackup {
                    issuer: backup.issuer(),
                    holder: keys.index(),
                });
            }
        }
        Ok(Guardian { keys })
    }

    pub fn index(&self) -> GuardianIndex {
        self.keys.index()
    }

    /// Whether this guardian can stand in for `missing`.
    pub fn holds_backup_for(&self, missing: GuardianIndex) -> bool {
        self.keys.backup_for(missing).is_some()
    }

    /// `M_i = pad^{z_i}` with a proof tying the exponent to `K_i`.
    pub fn decryption_share<R: Rng>(
        &self,
        pp: &CpParameters<C, Sha256>,
        ciphertext_id: CiphertextId,
        ciphertext: &Ciphertext<C>,
        rng: &mut R,
    ) -> Result<DecryptionShare<C>, DecryptionError> {
        let secret = self.keys.secret();
        let partial = ciphertext.pad() * secret;
        let tuple = DleqTuple::new(
            pp.generator,
            pp.generator * secret,
            ciphertext.pad(),
            partial,
        );
        let proof = ChaumPedersen::prove(pp, rng, tuple, secret)?;
        Ok(DecryptionShare::new(
            self.index(),
            ciphertext_id,
            partial,
            proof,
        ))
    }

    /// Partial decryption on behalf of the absent `missing` guardian,
    /// computed from the backup `Q_missing(i)` this guardian holds.
    pub fn compensated_share<R: Rng>(
        &self,
        pp: &CpParameters<C, Sha256>,
        ciphertext_id: CiphertextId,
        ciphertext: &Ciphertext<C>,
        missing: GuardianIndex,
        rng: &mut R,
    ) -> Result<CompensatedDecryptionShare<C>, DecryptionError> {
        let backup = self
            .keys
            .backup_for(missing)
            .ok_or(DecryptionError::MissingBackup {
                guardian: self.index(),
                missing,
            })?;
        let partial = ciphertext.pad() * backup;
        let tuple = DleqTuple::new(
            pp.generator,
            pp.generator * backup,
            ciphertext.pad(),
            partial,
        );
        let proof = ChaumPedersen::prove(pp, rng, tuple, backup)?;
        Ok(CompensatedDecryptionShare::new(
            self.index(),
            missing,
            ciphertext_id,
            partial,
            proof,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Projective;
    use ark_std::test_rng;
    use quorate_crypto::elgamal;
    use quorate_crypto::keys::{CeremonyConfig, trusted_key_ceremony};
    use std::num::NonZeroU32;

    fn ceremony(n: u32, k: u32) -> quorate_crypto::keys::CeremonyOutput<G1Projective> {
        let config = CeremonyConfig::new(
            NonZeroU32::new(n).unwrap(),
            NonZeroU32::new(k).unwrap(),
        )
        .unwrap();
        trusted_key_ceremony(config, &mut test_rng())
    }

    fn cid() -> CiphertextId {
        CiphertextId::new("ct-1")
    }

    #[test]
    fn test_direct_share_verifies() {
        let rng = &mut test_rng();
        let out = ceremony(3, 2);
        let pp = CpParameters::new(b"tally-1");
        let ct = elgamal::encrypt(&out.joint_key, 1, rng);

        let records = out.records;
        for keys in out.key_materials {
            let index = keys.index();
            let guardian = Guardian::new(keys, &records).unwrap();
            let share = guardian.decryption_share(&pp, cid(), &ct, rng).unwrap();
            assert_eq!(share.guardian(), index);
            share
                .verify(&pp, &records[(index.get() - 1) as usize], &ct)
                .unwrap();
        }
    }

    #[test]
    fn test_compensated_share_verifies_against_missing_record() {
        let rng = &mut test_rng();
        let out = ceremony(3, 2);
        let pp = CpParameters::new(b"tally-1");
        let ct = elgamal::encrypt(&out.joint_key, 1, rng);

        let records = out.records;
        let missing = GuardianIndex::new(3).unwrap();
        let mut materials = out.key_materials;
        materials.truncate(2);
        for keys in materials {
            let guardian = Guardian::new(keys, &records).unwrap();
            assert!(guardian.holds_backup_for(missing));
            let share = guardian
                .compensated_share(&pp, cid(), &ct, missing, rng)
                .unwrap();
            assert_eq!(share.missing(), missing);
            share.verify(&pp, &records[2], &ct).unwrap();
        }
    }

    #[test]
    fn test_no_backup_for_self() {
        let rng = &mut test_rng();
        let out = ceremony(3, 2);
        let pp = CpParameters::new(b"tally-1");
        let ct = elgamal::encrypt(&out.joint_key, 0, rng);

        let records = out.records;
        let keys = out.key_materials.into_iter().next().unwrap();
        let guardian = Guardian::new(keys, &records).unwrap();
        let own = guardian.index();
        assert!(matches!(
            guardian.compensated_share(&pp, cid(), &ct, own, rng),
            Err(DecryptionError::MissingBackup { .. })
        ));
    }

    #[test]
    fn test_mismatched_key_material_fails_verification() {
        let rng = &mut test_rng();
        let out = ceremony(3, 2);
        let pp = CpParameters::new(b"tally-1");
        let ct = elgamal::encrypt(&out.joint_key, 1, rng);

        // guardian 2's secret presented under guardian 1's identity
        let records = out.records;
        let mut materials = out.key_materials;
        let imposter_keys = materials.remove(1);
        let imposter = Guardian {
            keys: imposter_keys,
        };
        let share = imposter.decryption_share(&pp, cid(), &ct, rng).unwrap();
        assert!(matches!(
            share.verify(&pp, &records[0], &ct),
            Err(DecryptionError::InvalidProof { .. })
        ));
    }
}
