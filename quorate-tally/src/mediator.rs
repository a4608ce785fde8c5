//! Orchestration of one end-to-end decryption session.
//!
//! The mediator never touches secret material. It asks present guardians
//! for shares, arranges compensation for absent ones, verifies every
//! proof before a partial enters an aggregation set, and combines the
//! verified partials into the plaintext tally. Any terminal error aborts
//! the whole session; no partial tally is ever observable.

use ark_ec::CurveGroup;
use ark_std::rand::{Rng, RngCore, SeedableRng};
use parking_lot::Mutex;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use sha2::Sha256;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use quorate_crypto::GuardianIndex;
use quorate_crypto::cp_proof::CpParameters;
use quorate_crypto::elgamal::Ciphertext;
use quorate_crypto::keys::{CeremonyConfig, CeremonyError, GuardianPublicRecord};

use crate::aggregator::{ShareSet, ShareSetError, ShareSetState};
use crate::combiner::{self, LagrangeCoefficients};
use crate::error::DecryptionError;
use crate::guardian::Guardian;
use crate::tally::{
    CiphertextBallot, CiphertextId, CiphertextTally, DecryptionResult, PlaintextBallot,
    PlaintextContest, PlaintextTally,
};

/// Session phases. Failure from any phase lands in `Failed` with the
/// error it was aborted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    GuardiansAnnounced,
    SharesCollected,
    CompensationResolved,
    ProofsValidated,
    Combined,
    Complete,
    Failed(String),
}

pub struct DecryptionMediator<C: CurveGroup> {
    id: String,
    config: CeremonyConfig,
    tally: CiphertextTally<C>,
    records: BTreeMap<GuardianIndex, GuardianPublicRecord<C>>,
    max_selection_votes: u64,
    state: SessionState,
}

struct WorkItem<C: CurveGroup> {
    id: CiphertextId,
    ciphertext: Ciphertext<C>,
}

impl<C: CurveGroup> DecryptionMediator<C> {
    /// A mediator for one ciphertext tally, constructed from the
    /// published ceremony output. Every guardian of the ceremony must
    /// have exactly one well-formed record.
    pub fn new(
        id: impl Into<String>,
        tally: CiphertextTally<C>,
        records: Vec<GuardianPublicRecord<C>>,
        config: CeremonyConfig,
        max_selection_votes: u64,
    ) -> Result<Self, DecryptionError> {
        let mut by_index = BTreeMap::new();
        for record in records {
            record.validate(&config)?;
            let index = record.index();
            if by_index.insert(index, record).is_some() {
                return Err(DecryptionError::DuplicateGuardian(index));
            }
        }
        for index in config.indices() {
            if !by_index.contains_key(&index) {
                return Err(CeremonyError::MissingRecord(index).into());
            }
        }
        Ok(DecryptionMediator {
            id: id.into(),
            config,
            tally,
            records: by_index,
            max_selection_votes,
            state: SessionState::NotStarted,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tally(&self) -> &CiphertextTally<C> {
        &self.tally
    }

    /// Decrypt the tally and every challenged ballot with the given
    /// present guardians, compensating for the absent ones.
    pub fn run_decryption_process<R: Rng>(
        &mut self,
        challenged_ballots: &[CiphertextBallot<C>],
        present: &[Guardian<C>],
        rng: &mut R,
    ) -> Result<DecryptionResult, DecryptionError> {
        self.state = SessionState::NotStarted;
        match self.execute(challenged_ballots, present, rng) {
            Ok(result) => {
                self.state = SessionState::Complete;
                Ok(result)
            }
            Err(e) => {
                warn!(mediator = %self.id, error = %e, "decryption session aborted");
                self.state = SessionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn execute<R: Rng>(
        &mut self,
        challenged_ballots: &[CiphertextBallot<C>],
        present: &[Guardian<C>],
        rng: &mut R,
    ) -> Result<DecryptionResult, DecryptionError> {
        let quorum = self.config.quorum().get() as usize;

        // 1. announce the present guardians
        let mut present_set = BTreeSet::new();
        for guardian in present {
            let index = guardian.index();
            if !self.records.contains_key(&index) {
                return Err(DecryptionError::UnknownGuardian(index));
            }
            if !present_set.insert(index) {
                return Err(DecryptionError::DuplicateGuardian(index));
            }
        }
        if present_set.len() < quorum {
            return Err(DecryptionError::InsufficientGuardians {
                present: present_set.len(),
                quorum,
            });
        }
        self.state = SessionState::GuardiansAnnounced;
        info!(
            mediator = %self.id,
            present = present_set.len(),
            quorum,
            "guardians announced"
        );

        let all: BTreeSet<GuardianIndex> = self.config.indices().collect();
        let missing: Vec<GuardianIndex> = all
            .iter()
            .copied()
            .filter(|i| !present_set.contains(i))
            .collect();

        let pp: CpParameters<C, Sha256> =
            CpParameters::new(self.tally.id().as_str().as_bytes());
        let work = self.work_items(challenged_ballots)?;
        let aggregators: BTreeMap<&CiphertextId, Mutex<ShareSet<C>>> = work
            .iter()
            .map(|item| (&item.id, Mutex::new(ShareSet::new(all.clone(), quorum))))
            .collect();

        // 2. direct shares from every present guardian, in parallel;
        // each share is proof-checked before it enters an aggregator
        let seeds = derive_seeds(present.len(), rng);
        present
            .par_iter()
            .zip(seeds)
            .try_for_each(|(guardian, seed)| -> Result<(), DecryptionError> {
                let mut rng = ChaCha20Rng::from_seed(seed);
                let record = self
                    .records
                    .get(&guardian.index())
                    .expect("announced guardians have records");
                for item in &work {
                    let share =
                        guardian.decryption_share(&pp, item.id.clone(), &item.ciphertext, &mut rng)?;
                    share.verify(&pp, record, &item.ciphertext)?;
                    lookup(&aggregators, &item.id)
                        .lock()
                        .insert(guardian.index(), share.partial())
                        .map_err(|e| share_set_error(e, &item.id))?;
                }
                debug!(mediator = %self.id, guardian = %guardian.index(), "direct shares collected");
                Ok(())
            })?;
        self.state = SessionState::SharesCollected;

        // 3. compensate every absent guardian from its backup holders
        for missing_index in &missing {
            self.compensate(*missing_index, present, &pp, &work, &aggregators, quorum, rng)?;
        }
        self.state = SessionState::CompensationResolved;

        // 4. every partial in the aggregators is proof-verified; confirm
        // full coverage before anything is combined
        for item in &work {
            if lookup(&aggregators, &item.id).lock().state() != ShareSetState::Ready {
                return Err(DecryptionError::SharesIncomplete {
                    ciphertext: item.id.clone(),
                });
            }
        }
        self.state = SessionState::ProofsValidated;

        // 5-6. one coefficient set for the contributing guardians, then
        // per-selection combination in parallel
        let coefficients = LagrangeCoefficients::compute(&all)?;
        let counts: BTreeMap<CiphertextId, u64> = work
            .par_iter()
            .map(|item| -> Result<(CiphertextId, u64), DecryptionError> {
                let set = lookup(&aggregators, &item.id).lock();
                let partials = set.shares().map_err(|e| share_set_error(e, &item.id))?;
                let count = combiner::combine(
                    &item.id,
                    &item.ciphertext,
                    partials,
                    &coefficients,
                    self.max_selection_votes,
                )?;
                Ok((item.id.clone(), count))
            })
            .collect::<Result<_, _>>()?;
        self.state = SessionState::Combined;

        // 7. shape the counts back into tally and ballot structures
        let result = self.assemble(challenged_ballots, &counts);
        info!(
            mediator = %self.id,
            ciphertexts = work.len(),
            challenged = challenged_ballots.len(),
            "decryption complete"
        );
        Ok(result)
    }

    /// Collect compensated shares for one absent guardian from all its
    /// present backup holders and reconstruct its partial decryptions.
    #[allow(clippy::too_many_arguments)]
    fn compensate<R: Rng>(
        &self,
        missing: GuardianIndex,
        present: &[Guardian<C>],
        pp: &CpParameters<C, Sha256>,
        work: &[WorkItem<C>],
        aggregators: &BTreeMap<&CiphertextId, Mutex<ShareSet<C>>>,
        quorum: usize,
        rng: &mut R,
    ) -> Result<(), DecryptionError> {
        let holders: Vec<&Guardian<C>> = present
            .iter()
            .filter(|g| g.holds_backup_for(missing))
            .collect();
        if holders.len() < quorum {
            warn!(
                mediator = %self.id,
                missing = %missing,
                holders = holders.len(),
                "not enough backup holders to compensate"
            );
            return Err(DecryptionError::InsufficientGuardians {
                present: holders.len(),
                quorum,
            });
        }
        let holder_set: BTreeSet<GuardianIndex> = holders.iter().map(|g| g.index()).collect();
        let coefficients = LagrangeCoefficients::compute(&holder_set)?;
        let missing_record = self
            .records
            .get(&missing)
            .expect("missing guardians are ceremony guardians");

        let compensated: BTreeMap<&CiphertextId, Mutex<ShareSet<C>>> = work
            .iter()
            .map(|item| (&item.id, Mutex::new(ShareSet::new(holder_set.clone(), quorum))))
            .collect();

        let seeds = derive_seeds(holders.len(), rng);
        holders
            .par_iter()
            .zip(seeds)
            .try_for_each(|(guardian, seed)| -> Result<(), DecryptionError> {
                let mut rng = ChaCha20Rng::from_seed(seed);
                for item in work {
                    let share = guardian.compensated_share(
                        pp,
                        item.id.clone(),
                        &item.ciphertext,
                        missing,
                        &mut rng,
                    )?;
                    share.verify(pp, missing_record, &item.ciphertext)?;
                    lookup(&compensated, &item.id)
                        .lock()
                        .insert(guardian.index(), share.partial())
                        .map_err(|e| share_set_error(e, &item.id))?;
                }
                Ok(())
            })?;

        for (id, set) in compensated {
            let set = set.into_inner();
            let partials = set.shares().map_err(|e| share_set_error(e, id))?;
            let reconstructed = combiner::reconstruct_partial(partials, &coefficients)?;
            lookup(aggregators, id)
                .lock()
                .insert(missing, reconstructed)
                .map_err(|e| share_set_error(e, id))?;
        }
        debug!(mediator = %self.id, missing = %missing, "absent guardian compensated");
        Ok(())
    }

    fn work_items(
        &self,
        challenged_ballots: &[CiphertextBallot<C>],
    ) -> Result<Vec<WorkItem<C>>, DecryptionError> {
        let mut seen = BTreeSet::new();
        let mut items = Vec::new();
        for (contest, selections) in self.tally.contests() {
            for (selection, ciphertext) in selections.selections() {
                let id = CiphertextId::for_tally(self.tally.id(), contest, selection);
                if !seen.insert(id.clone()) {
                    return Err(DecryptionError::DuplicateCiphertext(id));
                }
                items.push(WorkItem {
                    id,
                    ciphertext: *ciphertext,
                });
            }
        }
        for ballot in challenged_ballots {
            for (contest, selections) in ballot.contests() {
                for (selection, ciphertext) in selections.selections() {
                    let id = CiphertextId::for_ballot(ballot.id(), contest, selection);
                    if !seen.insert(id.clone()) {
                        return Err(DecryptionError::DuplicateCiphertext(id));
                    }
                    items.push(WorkItem {
                        id,
                        ciphertext: *ciphertext,
                    });
                }
            }
        }
        Ok(items)
    }

    fn assemble(
        &self,
        challenged_ballots: &[CiphertextBallot<C>],
        counts: &BTreeMap<CiphertextId, u64>,
    ) -> DecryptionResult {
        let contests = self
            .tally
            .contests()
            .map(|(contest, selections)| {
                let decrypted = selections
                    .selections()
                    .map(|(selection, _)| {
                        let id = CiphertextId::for_tally(self.tally.id(), contest, selection);
                        (selection.clone(), counts[&id])
                    })
                    .collect();
                (contest.clone(), PlaintextContest::new(decrypted))
            })
            .collect();
        let tally = PlaintextTally::new(self.tally.id().clone(), contests);

        let ballots = challenged_ballots
            .iter()
            .map(|ballot| {
                let contests = ballot
                    .contests()
                    .map(|(contest, selections)| {
                        let decrypted = selections
                            .selections()
                            .map(|(selection, _)| {
                                let id =
                                    CiphertextId::for_ballot(ballot.id(), contest, selection);
                                (selection.clone(), counts[&id])
                            })
                            .collect();
                        (contest.clone(), PlaintextContest::new(decrypted))
                    })
                    .collect();
                PlaintextBallot::new(ballot.id().clone(), contests)
            })
            .collect();

        DecryptionResult {
            tally,
            challenged_ballots: ballots,
        }
    }
}

fn lookup<'a, C: CurveGroup>(
    sets: &'a BTreeMap<&CiphertextId, Mutex<ShareSet<C>>>,
    id: &CiphertextId,
) -> &'a Mutex<ShareSet<C>> {
    sets.get(id).expect("every work item has a share set")
}

fn share_set_error(e: ShareSetError, id: &CiphertextId) -> DecryptionError {
    match e {
        ShareSetError::Duplicate(guardian) => DecryptionError::DuplicateShare {
            guardian,
            ciphertext: id.clone(),
        },
        ShareSetError::Unexpected(guardian) => DecryptionError::UnknownGuardian(guardian),
        ShareSetError::NotReady { .. } => DecryptionError::SharesIncomplete {
            ciphertext: id.clone(),
        },
    }
}

fn derive_seeds<R: RngCore>(n: usize, rng: &mut R) -> Vec<[u8; 32]> {
    (0..n)
        .map(|_| {
            let mut seed = [0u8; 32];
            rng.fill_bytes(&mut seed);
            seed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Projective;
    use ark_std::test_rng;
    use quorate_crypto::elgamal;
    use quorate_crypto::keys::{
        CeremonyConfig, CeremonyOutput, GuardianKeyMaterial, trusted_key_ceremony,
    };
    use crate::tally::{ContestId, SelectionId, TallyId};
    use std::num::NonZeroU32;

    fn ceremony(n: u32, k: u32) -> CeremonyOutput<G1Projective> {
        let config = CeremonyConfig::new(
            NonZeroU32::new(n).unwrap(),
            NonZeroU32::new(k).unwrap(),
        )
        .unwrap();
        trusted_key_ceremony(config, &mut test_rng())
    }

    fn one_selection_tally(
        out: &CeremonyOutput<G1Projective>,
        count: u64,
    ) -> CiphertextTally<G1Projective> {
        let ct = elgamal::encrypt(&out.joint_key, count, &mut test_rng());
        let selections = [(SelectionId::new("s1"), ct)].into_iter().collect();
        let contests = [(
            ContestId::new("c1"),
            crate::tally::CiphertextContest::new(selections),
        )]
        .into_iter()
        .collect();
        CiphertextTally::new(TallyId::new("t1"), contests)
    }

    fn guardians(out: CeremonyOutput<G1Projective>) -> Vec<Guardian<G1Projective>> {
        let records = out.records;
        out.key_materials
            .into_iter()
            .map(|keys| Guardian::new(keys, &records).unwrap())
            .collect()
    }

    #[test]
    fn test_insufficient_guardians() {
        let rng = &mut test_rng();
        let out = ceremony(3, 2);
        let tally = one_selection_tally(&out, 1);
        let records = out.records.clone();
        let config = out.config;
        let mut guardians = guardians(out);
        guardians.truncate(1);

        let mut mediator =
            DecryptionMediator::new("mediator", tally, records, config, 1).unwrap();
        let err = mediator
            .run_decryption_process(&[], &guardians, rng)
            .unwrap_err();
        assert!(matches!(
            err,
            DecryptionError::InsufficientGuardians {
                present: 1,
                quorum: 2
            }
        ));
        assert!(matches!(mediator.state(), SessionState::Failed(_)));
    }

    #[test]
    fn test_unknown_guardian() {
        let rng = &mut test_rng();
        let out = ceremony(2, 2);
        let tally = one_selection_tally(&out, 0);
        let records = out.records.clone();
        let config = out.config;

        // a guardian from a different, larger ceremony
        let stranger_out = ceremony(3, 2);
        let stranger = {
            let records = stranger_out.records;
            let keys = stranger_out.key_materials.into_iter().nth(2).unwrap();
            Guardian::new(keys, &records).unwrap()
        };

        let mut mediator =
            DecryptionMediator::new("mediator", tally, records, config, 1).unwrap();
        let err = mediator
            .run_decryption_process(&[], &[stranger], rng)
            .unwrap_err();
        assert!(matches!(err, DecryptionError::UnknownGuardian(_)));
    }

    #[test]
    fn test_duplicate_guardian_announcement() {
        let rng = &mut test_rng();
        let out = ceremony(2, 2);
        let tally = one_selection_tally(&out, 0);
        let records = out.records.clone();
        let config = out.config;

        let first = &out.key_materials[0];
        let copy_a = Guardian::new(
            GuardianKeyMaterial::new(first.index(), *first.secret(), Vec::new()),
            &records,
        )
        .unwrap();
        let copy_b = Guardian::new(
            GuardianKeyMaterial::new(first.index(), *first.secret(), Vec::new()),
            &records,
        )
        .unwrap();

        let mut mediator =
            DecryptionMediator::new("mediator", tally, records, config, 1).unwrap();
        let err = mediator
            .run_decryption_process(&[], &[copy_a, copy_b], rng)
            .unwrap_err();
        assert!(matches!(err, DecryptionError::DuplicateGuardian(_)));
    }
}
