//! QR_N for a special RSA modulus N = p*q with p = 2p'+1 and q = 2q'+1.
//!
//! [`RsaSpecialGroup`] knows the factorization and belongs to whoever ran the
//! setup (the issuer). [`RsaPublicGroup`] carries only N and is what a remote
//! verifier holds.
use super::{Group, GroupError, HiddenOrderGroup, KnownOrderGroup, PRIMALITY_REPS};
use crate::{
    parameters::Parameters,
    utils::{random_between, random_bits},
};
use rug::integer::IsPrime;
use rug::rand::MutRandState;
use rug::Integer;
use std::fmt;

#[derive(Clone)]
pub struct RsaSpecialGroup {
    modulus: Integer,
    p: Integer,
    q: Integer,
    // p' * q', the order of QR_N
    order: Integer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicGroup {
    modulus: Integer,
}

fn is_prime(n: &Integer) -> bool {
    n.is_probably_prime(PRIMALITY_REPS) != IsPrime::No
}

/// Random safe prime of exactly `bits` bits. The smallest, 7, has 3 bits.
pub fn generate_safe_prime<R: MutRandState>(bits: u32, rng: &mut R) -> Result<Integer, GroupError> {
    if bits < 3 {
        return Err(GroupError::InvalidParameters);
    }
    loop {
        let mut p_prime = random_bits(rng, bits - 1);
        p_prime.set_bit(bits - 2, true);
        let p_prime = p_prime.next_prime();
        let p = Integer::from(2 * &p_prime) + 1u32;
        if p.significant_bits() == bits && is_prime(&p) {
            return Ok(p);
        }
    }
}

impl RsaSpecialGroup {
    pub fn from_safe_primes(p: &Integer, q: &Integer) -> Result<RsaSpecialGroup, GroupError> {
        if p == q {
            return Err(GroupError::InvalidParameters);
        }
        let mut order = Integer::from(1);
        for prime in &[p, q] {
            if !is_prime(prime) {
                return Err(GroupError::NotPrime);
            }
            let half = Integer::from(*prime - 1u32) >> 1u32;
            if half < 2 || !is_prime(&half) {
                return Err(GroupError::NotSafePrime);
            }
            order *= half;
        }

        Ok(RsaSpecialGroup {
            modulus: Integer::from(p * q),
            p: p.clone(),
            q: q.clone(),
            order,
        })
    }

    /// Generates a fresh modulus of `modulus_bits` bits from two safe primes.
    pub fn generate<R: MutRandState>(
        modulus_bits: u32,
        rng: &mut R,
    ) -> Result<RsaSpecialGroup, GroupError> {
        if modulus_bits < 16 || modulus_bits % 2 != 0 {
            return Err(GroupError::InvalidParameters);
        }
        let p = generate_safe_prime(modulus_bits / 2, rng)?;
        let mut q = generate_safe_prime(modulus_bits / 2, rng)?;
        while q == p {
            q = generate_safe_prime(modulus_bits / 2, rng)?;
        }
        Self::from_safe_primes(&p, &q)
    }

    /// A fresh group with the modulus size of `parameters`.
    pub fn from_parameters<R: MutRandState>(
        parameters: &Parameters,
        rng: &mut R,
    ) -> Result<RsaSpecialGroup, GroupError> {
        Self::generate(parameters.modulus_bits as u32, rng)
    }

    pub fn primes(&self) -> (&Integer, &Integer) {
        (&self.p, &self.q)
    }

    /// Membership in QR_N, decided through the Legendre symbols modulo both primes.
    pub fn is_quadratic_residue(&self, x: &Integer) -> bool {
        let x = self.elem(x);
        x.legendre(&self.p) == 1 && x.legendre(&self.q) == 1
    }

    /// The same group without the factorization, safe to hand to a remote party.
    pub fn public(&self) -> RsaPublicGroup {
        RsaPublicGroup::new(&self.modulus)
    }
}

impl fmt::Debug for RsaSpecialGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RsaSpecialGroup")
            .field("modulus", &self.modulus)
            .finish()
    }
}

impl RsaPublicGroup {
    pub fn new(modulus: &Integer) -> RsaPublicGroup {
        RsaPublicGroup {
            modulus: modulus.clone(),
        }
    }
}

impl Group for RsaSpecialGroup {
    fn modulus(&self) -> &Integer {
        &self.modulus
    }
}

impl Group for RsaPublicGroup {
    fn modulus(&self) -> &Integer {
        &self.modulus
    }
}

impl HiddenOrderGroup for RsaSpecialGroup {
    fn order_upper_bound(&self) -> Integer {
        Integer::from(&self.modulus >> 2u32)
    }
}

impl HiddenOrderGroup for RsaPublicGroup {
    fn order_upper_bound(&self) -> Integer {
        Integer::from(&self.modulus >> 2u32)
    }
}

impl KnownOrderGroup for RsaSpecialGroup {
    fn order(&self) -> &Integer {
        &self.order
    }
}

/// A uniformly random square modulo N that is coprime to N.
pub fn random_quadratic_residue<G: HiddenOrderGroup, R: MutRandState>(
    group: &G,
    rng: &mut R,
) -> Integer {
    let two = Integer::from(2);
    loop {
        let x = random_between(rng, &two, group.modulus());
        if Integer::from(x.gcd_ref(group.modulus())) == 1 {
            return group.op(&x, &x);
        }
    }
}
