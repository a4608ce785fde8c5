//! Chaum-Pedersen proofs of discrete-log equality.
//!
//! A share of a partial decryption is only trustworthy together with a
//! proof that the exponent used for it is the same one behind the
//! guardian's public key share. The sigma protocol below proves
//! `DLOG_g(g_hat) == DLOG_h(h_hat)` without revealing the exponent,
//! made non-interactive with a hash-to-field Fiat-Shamir challenge.

use std::marker::PhantomData;

use anyhow::anyhow;
use ark_ec::CurveGroup;
use ark_ff::field_hashers::{DefaultFieldHasher, HashToField};
use ark_std::UniformRand;
use ark_std::rand::Rng;
use digest::FixedOutputReset;
use digest::core_api::BlockSizeUser;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sha2::Sha256;

use crate::serde_bridge::SerdeAs;
use crate::traits::dleq_proof::{DleqProofError, DleqProofScheme};

pub struct ChaumPedersen<C, H = Sha256> {
    _group: PhantomData<C>,
    _hash: PhantomData<H>,
}

#[derive(Clone, Debug)]
pub struct CpParameters<C: CurveGroup, H = Sha256> {
    _hash: PhantomData<H>,
    pub generator: C,
    /// Session binding mixed into every challenge (e.g. the tally id).
    pub context: Vec<u8>,
}

impl<C: CurveGroup, H> CpParameters<C, H> {
    pub fn new(context: &[u8]) -> Self {
        CpParameters {
            _hash: PhantomData,
            generator: C::generator(),
            context: context.to_vec(),
        }
    }
}

// Tuple (g, g_hat, h, h_hat)
// Subject to proving: DLOG_{g}(g_hat) == DLOG_{h}(h_hat)
#[derive(Clone, Copy, Debug)]
pub struct DleqTuple<C: CurveGroup>(C, C, C, C);

impl<C: CurveGroup> DleqTuple<C> {
    pub fn new(g: C, g_hat: C, h: C, h_hat: C) -> Self {
        DleqTuple(g, g_hat, h, h_hat)
    }
}

/// Non-interactive sigma protocol transcript: commitments for both
/// relations, the derived challenge and the single response.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof<C: CurveGroup> {
    #[serde_as(as = "SerdeAs")]
    commit_g: C,
    #[serde_as(as = "SerdeAs")]
    commit_h: C,
    #[serde_as(as = "SerdeAs")]
    challenge: C::ScalarField,
    #[serde_as(as = "SerdeAs")]
    response: C::ScalarField,
}

impl<C, H> ChaumPedersen<C, H>
where
    C: CurveGroup,
    H: FixedOutputReset + BlockSizeUser + Default + Clone,
{
    const DS_TAGS: [&'static [u8]; 6] = [b"g", b"g_hat", b"h", b"h_hat", b"commit_g", b"commit_h"];

    /// Fiat-Shamir challenge over the full tuple and both commitments.
    fn challenge(
        pp: &CpParameters<C, H>,
        tuple: &DleqTuple<C>,
        commit_g: &C,
        commit_h: &C,
    ) -> Result<C::ScalarField, DleqProofError> {
        let points = [
            &tuple.0, &tuple.1, &tuple.2, &tuple.3, commit_g, commit_h,
        ];
        let mut buffer = Vec::new();
        for (tag, point) in Self::DS_TAGS.iter().zip(points) {
            buffer.extend_from_slice(tag);
            point
                .serialize_compressed(&mut buffer)
                .map_err(|e| DleqProofError::Internal(anyhow!("challenge input: {e}")))?;
        }
        let hasher =
            <DefaultFieldHasher<H> as HashToField<C::ScalarField>>::new(&pp.context);
        Ok(hasher.hash_to_field::<1>(&buffer)[0])
    }
}

impl<C, H> DleqProofScheme for ChaumPedersen<C, H>
where
    C: CurveGroup,
    H: FixedOutputReset + BlockSizeUser + Default + Clone,
{
    type Parameters = CpParameters<C, H>;
    type DleqTuple = DleqTuple<C>;
    type Scalar = C::ScalarField;
    type Proof = Proof<C>;

    fn prove<R: Rng>(
        pp: &CpParameters<C, H>,
        rng: &mut R,
        tuple: DleqTuple<C>,
        x: &C::ScalarField,
    ) -> Result<Proof<C>, DleqProofError> {
        let DleqTuple(g, g_hat, h, h_hat) = tuple;
        if g * x != g_hat || h * x != h_hat {
            return Err(DleqProofError::Argument(
                "tuple is not a DLEQ instance for the witness".to_string(),
            ));
        }

        let r = C::ScalarField::rand(rng);
        let commit_g = g * r;
        let commit_h = h * r;
        let challenge = Self::challenge(pp, &tuple, &commit_g, &commit_h)?;
        let response = r + challenge * x;

        Ok(Proof {
            commit_g,
            commit_h,
            challenge,
            response,
        })
    }

    fn verify(
        pp: &CpParameters<C, H>,
        tuple: DleqTuple<C>,
        proof: &Proof<C>,
    ) -> Result<(), DleqProofError> {
        let DleqTuple(g, g_hat, h, h_hat) = tuple;

        let challenge = Self::challenge(pp, &tuple, &proof.commit_g, &proof.commit_h)?;
        if challenge != proof.challenge {
            return Err(DleqProofError::ProofNotValid);
        }
        // g^v = u * g_hat^c
        if g * proof.response != proof.commit_g + g_hat * proof.challenge {
            return Err(DleqProofError::ProofNotValid);
        }
        // h^v = u' * h_hat^c
        if h * proof.response != proof.commit_h + h_hat * proof.challenge {
            return Err(DleqProofError::ProofNotValid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::test_rng;

    type Scheme<C> = ChaumPedersen<C, Sha256>;

    fn tuple_for<C: CurveGroup>(x: &C::ScalarField, h: C) -> DleqTuple<C> {
        let g = C::generator();
        DleqTuple::new(g, g * x, h, h * x)
    }

    fn test_dleq_proof_valid<C: CurveGroup>() {
        let rng = &mut test_rng();
        let pp = CpParameters::new(b"cp-test");
        let x = C::ScalarField::rand(rng);
        let tuple = tuple_for(&x, C::rand(rng));

        let proof = Scheme::<C>::prove(&pp, rng, tuple, &x).unwrap();
        assert!(Scheme::<C>::verify(&pp, tuple, &proof).is_ok());
    }

    fn test_dleq_proof_tampered<C: CurveGroup>() {
        let rng = &mut test_rng();
        let pp = CpParameters::new(b"cp-test");
        let x = C::ScalarField::rand(rng);
        let tuple = tuple_for(&x, C::rand(rng));

        let proof = Scheme::<C>::prove(&pp, rng, tuple, &x).unwrap();
        let tampered = Proof {
            response: proof.response + C::ScalarField::from(1u64),
            ..proof
        };
        assert!(matches!(
            Scheme::<C>::verify(&pp, tuple, &tampered),
            Err(DleqProofError::ProofNotValid)
        ));
    }

    fn test_dleq_proof_wrong_instance<C: CurveGroup>() {
        let rng = &mut test_rng();
        let pp = CpParameters::new(b"cp-test");
        let x = C::ScalarField::rand(rng);
        let tuple = tuple_for(&x, C::rand(rng));
        let proof = Scheme::<C>::prove(&pp, rng, tuple, &x).unwrap();

        // proof does not transfer to a different statement
        let other = tuple_for(&C::ScalarField::rand(rng), C::rand(rng));
        assert!(Scheme::<C>::verify(&pp, other, &proof).is_err());
    }

    fn test_dleq_proof_context_binding<C: CurveGroup>() {
        let rng = &mut test_rng();
        let pp = CpParameters::new(b"session-a");
        let x = C::ScalarField::rand(rng);
        let tuple = tuple_for(&x, C::rand(rng));
        let proof = Scheme::<C>::prove(&pp, rng, tuple, &x).unwrap();

        let other_pp = CpParameters::new(b"session-b");
        assert!(matches!(
            Scheme::<C>::verify(&other_pp, tuple, &proof),
            Err(DleqProofError::ProofNotValid)
        ));
    }

    fn test_dleq_proof_bad_witness<C: CurveGroup>() {
        let rng = &mut test_rng();
        let pp = CpParameters::<C, Sha256>::new(b"cp-test");
        let x = C::ScalarField::rand(rng);
        let g = C::generator();
        let h = C::rand(rng);
        // mismatched h_hat: the claimed equality does not hold
        let tuple = DleqTuple::new(g, g * x, h, h * C::ScalarField::rand(rng));
        assert!(matches!(
            Scheme::<C>::prove(&pp, rng, tuple, &x),
            Err(DleqProofError::Argument(_))
        ));
    }

    #[test]
    fn test_dleq_proof_bls12_381() {
        test_dleq_proof_valid::<ark_bls12_381::G1Projective>();
        test_dleq_proof_tampered::<ark_bls12_381::G1Projective>();
        test_dleq_proof_wrong_instance::<ark_bls12_381::G1Projective>();
        test_dleq_proof_context_binding::<ark_bls12_381::G1Projective>();
        test_dleq_proof_bad_witness::<ark_bls12_381::G1Projective>();
    }

    #[test]
    fn test_dleq_proof_bn254() {
        test_dleq_proof_valid::<ark_bn254::G1Projective>();
        test_dleq_proof_tampered::<ark_bn254::G1Projective>();
        test_dleq_proof_wrong_instance::<ark_bn254::G1Projective>();
        test_dleq_proof_context_binding::<ark_bn254::G1Projective>();
        test_dleq_proof_bad_witness::<ark_bn254::G1Projective>();
    }
}
