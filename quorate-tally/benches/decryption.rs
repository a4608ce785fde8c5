use ark_bls12_381::G1Projective;
use ark_std::rand::SeedableRng;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use quorate_crypto::cp_proof::CpParameters;
use quorate_crypto::elgamal;
use quorate_crypto::keys::{CeremonyConfig, CeremonyOutput, trusted_key_ceremony};
use quorate_tally::Guardian;
use quorate_tally::mediator::DecryptionMediator;
use quorate_tally::tally::{
    CiphertextContest, CiphertextId, CiphertextTally, ContestId, SelectionId, TallyId,
};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::num::NonZeroU32;

const MAX_VOTES: u64 = 1000;

fn rng() -> ChaCha20Rng {
    ChaCha20Rng::from_seed([3u8; 32])
}

fn ceremony(n: u32, k: u32) -> CeremonyOutput<G1Projective> {
    let config = CeremonyConfig::new(
        NonZeroU32::new(n).unwrap(),
        NonZeroU32::new(k).unwrap(),
    )
    .unwrap();
    trusted_key_ceremony(config, &mut rng())
}

fn one_selection_tally(out: &CeremonyOutput<G1Projective>) -> CiphertextTally<G1Projective> {
    let ct = elgamal::encrypt(&out.joint_key, 42, &mut rng());
    let selections = [(SelectionId::new("s"), ct)].into_iter().collect();
    let contests = [(ContestId::new("c"), CiphertextContest::new(selections))]
        .into_iter()
        .collect();
    CiphertextTally::new(TallyId::new("bench"), contests)
}

fn guardians(out: CeremonyOutput<G1Projective>) -> Vec<Guardian<G1Projective>> {
    let records = out.records;
    out.key_materials
        .into_iter()
        .map(|m| Guardian::new(m, &records).unwrap())
        .collect()
}

fn threshold_decryption(c: &mut Criterion) {
    let sizes = [(3u32, 2u32), (5, 3), (10, 7)];

    let mut grp = c.benchmark_group("direct_share");
    for (n, k) in sizes {
        let out = ceremony(n, k);
        let ct = elgamal::encrypt(&out.joint_key, 1, &mut rng());
        let pp: CpParameters<G1Projective, Sha256> = CpParameters::new(b"bench");
        let guardian = guardians(out).remove(0);
        grp.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut r = rng();
            b.iter(|| {
                guardian
                    .decryption_share(&pp, CiphertextId::new("ct"), &ct, &mut r)
                    .expect("compute decryption share");
            });
        });
    }
    grp.finish();

    let mut grp = c.benchmark_group("full_session");
    for (n, k) in sizes {
        let out = ceremony(n, k);
        let tally = one_selection_tally(&out);
        let config = out.config;
        let records = out.records.clone();
        let guardians = guardians(out);
        grp.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut mediator = DecryptionMediator::new(
                    "bench",
                    tally.clone(),
                    records.clone(),
                    config,
                    MAX_VOTES,
                )
                .expect("construct mediator");
                mediator
                    .run_decryption_process(&[], &guardians, &mut rng())
                    .expect("run decryption");
            });
        });
    }
    grp.finish();

    let mut grp = c.benchmark_group("quorum_session_with_compensation");
    for (n, k) in sizes {
        let out = ceremony(n, k);
        let tally = one_selection_tally(&out);
        let config = out.config;
        let records = out.records.clone();
        let mut guardians = guardians(out);
        guardians.truncate(k as usize);
        grp.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut mediator = DecryptionMediator::new(
                    "bench",
                    tally.clone(),
                    records.clone(),
                    config,
                    MAX_VOTES,
                )
                .expect("construct mediator");
                mediator
                    .run_decryption_process(&[], &guardians, &mut rng())
                    .expect("run decryption");
            });
        });
    }
    grp.finish();
}

criterion_group!(name = benches; config = Criterion::default().sample_size(10); targets = threshold_decryption);

criterion_main!(benches);
