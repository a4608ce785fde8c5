//! Per-ciphertext accumulation of verified partial decryptions.
//!
//! One [`ShareSet`] exists per ciphertext in a session, keyed by the
//! guardian that contributed. The set only ever holds proof-verified
//! partials, admits at most one entry per guardian, and releases them
//! exclusively once the expected contributing set is fully covered.

use ark_ec::CurveGroup;
use quorate_crypto::GuardianIndex;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareSetState {
    Empty,
    Partial,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareSetError {
    #[error("{0} is not expected to contribute to this ciphertext")]
    Unexpected(GuardianIndex),
    #[error("{0} already contributed to this ciphertext")]
    Duplicate(GuardianIndex),
    #[error("share set not ready: {have} of {expected} contributions")]
    NotReady { have: usize, expected: usize },
}

#[derive(Debug)]
pub struct ShareSet<C: CurveGroup> {
    expected: BTreeSet<GuardianIndex>,
    quorum: usize,
    entries: BTreeMap<GuardianIndex, C>,
}

impl<C: CurveGroup> ShareSet<C> {
    pub fn new(expected: BTreeSet<GuardianIndex>, quorum: usize) -> Self {
        ShareSet {
            expected,
            quorum,
            entries: BTreeMap::new(),
        }
    }

    /// Record `guardian`'s verified partial decryption.
    pub fn insert(&mut self, guardian: GuardianIndex, partial: C) -> Result<(), ShareSetError> {
        if !self.expected.contains(&guardian) {
            return Err(ShareSetError::Unexpected(guardian));
        }
        if self.entries.contains_key(&guardian) {
            return Err(ShareSetError::Duplicate(guardian));
        }
        self.entries.insert(guardian, partial);
        Ok(())
    }

    pub fn state(&self) -> ShareSetState {
        if self.entries.is_empty() {
            ShareSetState::Empty
        } else if self.entries.len() == self.expected.len() && self.entries.len() >= self.quorum {
            ShareSetState::Ready
        } else {
            ShareSetState::Partial
        }
    }

    /// The accumulated partials, available only once [`ShareSetState::Ready`].
    pub fn shares(&self) -> Result<&BTreeMap<GuardianIndex, C>, ShareSetError> {
        match self.state() {
            ShareSetState::Ready => Ok(&self.entries),
            _ => Err(ShareSetError::NotReady {
                have: self.entries.len(),
                expected: self.expected.len(),
            }),
        }
    }
}
