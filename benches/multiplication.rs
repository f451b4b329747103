use criterion::{criterion_group, criterion_main, Criterion};
use df_sigma::commitments::integer::{Committer, IntegerCommitment, Receiver};
use df_sigma::group::rsa::RsaSpecialGroup;
use df_sigma::parameters::Parameters;
use df_sigma::protocols::multiplication::{MultiplicationProver, MultiplicationVerifier};
use df_sigma::utils::pow2;
use rug::rand::RandState;
use rug::Integer;

pub fn criterion_benchmark(c: &mut Criterion) {
    let params = Parameters::from_security_level(80).unwrap();
    let mut rng1 = RandState::new();
    rng1.seed(&Integer::from(13));
    let group = RsaSpecialGroup::from_parameters(&params, &mut rng1).unwrap();
    let crs = IntegerCommitment::setup(&group, &pow2(256), params.security_level, &mut rng1).unwrap();

    let x1 = Integer::from(1) << 100;
    let x2 = (Integer::from(1) << 127) - 1;
    let x3 = Integer::from(&x1 * &x2);
    let mut committers = vec![];
    let mut receivers = vec![];
    for x in &[x1, x2, x3] {
        let mut committer = Committer::new(&crs);
        let commitment = committer.get_commit_msg(x, &mut rng1).unwrap();
        receivers.push(Receiver::with_commitment(&crs, &commitment));
        committers.push(committer);
    }

    c.bench_function("multiplication protocol", |b| {
        b.iter(|| {
            let mut prover =
                MultiplicationProver::new(&committers[0], &committers[1], &committers[2], params.challenge_bits)
                    .unwrap();
            let mut verifier =
                MultiplicationVerifier::new(&receivers[0], &receivers[1], &receivers[2], params.challenge_bits)
                    .unwrap();
            verifier
                .set_proof_random_data(&prover.get_proof_random_data(&mut rng1).unwrap())
                .unwrap();
            let challenge = verifier.get_challenge(&mut rng1).unwrap();
            assert!(verifier.verify(&prover.get_proof_data(&challenge).unwrap()).unwrap());
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
