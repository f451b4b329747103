use criterion::{criterion_group, criterion_main, Criterion};
use df_sigma::group::{rsa::RsaSpecialGroup, Group, HiddenOrderGroup};
use df_sigma::parameters::Parameters;
use df_sigma::utils::{pow2, random_between, random_symmetric_range};
use rug::rand::RandState;
use rug::Integer;

pub fn criterion_benchmark(c: &mut Criterion) {
    let params = Parameters::from_security_level(80).unwrap();
    let mut rng1 = RandState::new();
    rng1.seed(&Integer::from(13));
    let group = RsaSpecialGroup::from_parameters(&params, &mut rng1).unwrap();
    let r_range = Integer::from(group.order_upper_bound() * pow2((params.security_level + params.challenge_bits) as u32));

    c.bench_function("RSA signed exponentiation", |b| {
        b.iter(|| {
            let e = random_between(&mut rng1, &Integer::from(2), group.modulus());
            let r = random_symmetric_range(&mut rng1, &r_range);
            group.exp(&e, &r).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
