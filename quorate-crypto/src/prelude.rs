//! Concrete type instantiations for common use cases.
//!
//! The decryption core is generic over the group; this module pins the
//! production choice to BLS12-381 G1 with SHA-256 challenge hashing so
//! consumers don't have to spell out generic parameters.

use ark_bls12_381::G1Projective;
use sha2::Sha256;

use crate::{cp_proof, elgamal, keys};

/// Group used for all election arithmetic.
pub type Group = G1Projective;

/// Scalar field of [`Group`].
pub type Scalar = ark_bls12_381::Fr;

/// ElGamal pair over [`Group`].
pub type Ciphertext = elgamal::Ciphertext<Group>;

/// Chaum-Pedersen scheme over [`Group`].
pub type DleqScheme = cp_proof::ChaumPedersen<Group, Sha256>;

/// Parameters (generator + session context) for [`DleqScheme`].
pub type DleqParameters = cp_proof::CpParameters<Group, Sha256>;

/// Proof transcript produced by [`DleqScheme`].
pub type DleqProof = cp_proof::Proof<Group>;

/// Election public key.
pub type JointPublicKey = keys::JointPublicKey<Group>;

/// Published per-guardian ceremony output.
pub type GuardianPublicRecord = keys::GuardianPublicRecord<Group>;

/// Secret per-guardian ceremony output.
pub type GuardianKeyMaterial = keys::GuardianKeyMaterial<Group>;

/// Complete trusted-dealer ceremony output.
pub type CeremonyOutput = keys::CeremonyOutput<Group>;
