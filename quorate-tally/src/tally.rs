//! Ciphertext and plaintext shapes of a tally.
//!
//! Contest and selection ids come from the external manifest and only
//! shape the result maps; none of them enter the arithmetic.

use ark_ec::CurveGroup;
use quorate_crypto::elgamal::Ciphertext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! object_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(id: S) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }
    };
}

object_id!(
    /// Object id of a ciphertext tally.
    TallyId
);
object_id!(
    /// Object id of a (challenged) ballot.
    BallotId
);
object_id!(
    /// Object id of a contest within a tally or ballot.
    ContestId
);
object_id!(
    /// Object id of a selection within a contest.
    SelectionId
);
object_id!(
    /// Fully qualified id of one selection ciphertext in a session.
    CiphertextId
);

impl CiphertextId {
    pub fn for_tally(tally: &TallyId, contest: &ContestId, selection: &SelectionId) -> Self {
        CiphertextId(format!("tally:{tally}/{contest}/{selection}"))
    }

    pub fn for_ballot(ballot: &BallotId, contest: &ContestId, selection: &SelectionId) -> Self {
        CiphertextId(format!("ballot:{ballot}/{contest}/{selection}"))
    }
}

/// Selection ciphertexts of one contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CiphertextContest<C: CurveGroup> {
    selections: BTreeMap<SelectionId, Ciphertext<C>>,
}

impl<C: CurveGroup> CiphertextContest<C> {
    pub fn new(selections: BTreeMap<SelectionId, Ciphertext<C>>) -> Self {
        CiphertextContest { selections }
    }

    pub fn selections(&self) -> impl Iterator<Item = (&SelectionId, &Ciphertext<C>)> {
        self.selections.iter()
    }
}

/// The homomorphically accumulated tally, as produced by the external
/// encryption component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CiphertextTally<C: CurveGroup> {
    id: TallyId,
    contests: BTreeMap<ContestId, CiphertextContest<C>>,
}

impl<C: CurveGroup> CiphertextTally<C> {
    pub fn new(id: TallyId, contests: BTreeMap<ContestId, CiphertextContest<C>>) -> Self {
        CiphertextTally { id, contests }
    }

    pub fn id(&self) -> &TallyId {
        &self.id
    }

    pub fn contests(&self) -> impl Iterator<Item = (&ContestId, &CiphertextContest<C>)> {
        self.contests.iter()
    }
}

/// One challenged ballot awaiting individual decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CiphertextBallot<C: CurveGroup> {
    id: BallotId,
    contests: BTreeMap<ContestId, CiphertextContest<C>>,
}

impl<C: CurveGroup> CiphertextBallot<C> {
    pub fn new(id: BallotId, contests: BTreeMap<ContestId, CiphertextContest<C>>) -> Self {
        CiphertextBallot { id, contests }
    }

    pub fn id(&self) -> &BallotId {
        &self.id
    }

    pub fn contests(&self) -> impl Iterator<Item = (&ContestId, &CiphertextContest<C>)> {
        self.contests.iter()
    }
}

/// Decrypted counts of one contest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextContest {
    selections: BTreeMap<SelectionId, u64>,
}

impl PlaintextContest {
    pub fn new(selections: BTreeMap<SelectionId, u64>) -> Self {
        PlaintextContest { selections }
    }

    pub fn count(&self, selection: &SelectionId) -> Option<u64> {
        self.selections.get(selection).copied()
    }

    pub fn selections(&self) -> impl Iterator<Item = (&SelectionId, u64)> {
        self.selections.iter().map(|(id, count)| (id, *count))
    }
}

/// The fully decrypted tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextTally {
    id: TallyId,
    contests: BTreeMap<ContestId, PlaintextContest>,
}

impl PlaintextTally {
    pub fn new(id: TallyId, contests: BTreeMap<ContestId, PlaintextContest>) -> Self {
        PlaintextTally { id, contests }
    }

    pub fn id(&self) -> &TallyId {
        &self.id
    }

    pub fn contest(&self, contest: &ContestId) -> Option<&PlaintextContest> {
        self.contests.get(contest)
    }

    pub fn contests(&self) -> impl Iterator<Item = (&ContestId, &PlaintextContest)> {
        self.contests.iter()
    }
}

/// One decrypted challenged ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextBallot {
    id: BallotId,
    contests: BTreeMap<ContestId, PlaintextContest>,
}

impl PlaintextBallot {
    pub fn new(id: BallotId, contests: BTreeMap<ContestId, PlaintextContest>) -> Self {
        PlaintextBallot { id, contests }
    }

    pub fn id(&self) -> &BallotId {
        &self.id
    }

    pub fn contest(&self, contest: &ContestId) -> Option<&PlaintextContest> {
        self.contests.get(contest)
    }
}

/// Outcome of one complete decryption session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionResult {
    pub tally: PlaintextTally,
    pub challenged_ballots: Vec<PlaintextBallot>,
}
