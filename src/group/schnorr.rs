//! Prime-order subgroup of Z_p^*, the setting of the classic Schnorr proof.
use super::{Group, GroupError, KnownOrderGroup, PRIMALITY_REPS};
use crate::utils::{random_between, random_bits};
use rug::integer::IsPrime;
use rug::rand::MutRandState;
use rug::Integer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchnorrGroup {
    p: Integer,
    q: Integer,
    g: Integer,
}

impl SchnorrGroup {
    pub fn new(p: &Integer, q: &Integer, g: &Integer) -> Result<SchnorrGroup, GroupError> {
        if p.is_probably_prime(PRIMALITY_REPS) == IsPrime::No
            || q.is_probably_prime(PRIMALITY_REPS) == IsPrime::No
        {
            return Err(GroupError::NotPrime);
        }
        if !Integer::from(p - 1u32).is_divisible(q) {
            return Err(GroupError::InvalidParameters);
        }
        let group = SchnorrGroup {
            p: p.clone(),
            q: q.clone(),
            g: Integer::new(),
        };
        let g = group.elem(g);
        if g <= 1 || group.exp(&g, q).map_err(|_| GroupError::InvalidGenerator)? != 1 {
            return Err(GroupError::InvalidGenerator);
        }
        Ok(SchnorrGroup { g, ..group })
    }

    /// Generates p with `modulus_bits` bits such that a prime q with
    /// `order_bits` bits divides p - 1.
    pub fn generate<R: MutRandState>(
        modulus_bits: u32,
        order_bits: u32,
        rng: &mut R,
    ) -> Result<SchnorrGroup, GroupError> {
        if order_bits < 2 || modulus_bits <= order_bits + 1 {
            return Err(GroupError::InvalidParameters);
        }
        let q = loop {
            let mut candidate = random_bits(rng, order_bits);
            candidate.set_bit(order_bits - 1, true);
            let candidate = candidate.next_prime();
            if candidate.significant_bits() == order_bits {
                break candidate;
            }
        };
        let cofactor_bits = modulus_bits - order_bits;
        let p = loop {
            let mut cofactor = random_bits(rng, cofactor_bits);
            cofactor.set_bit(cofactor_bits - 1, true);
            cofactor.set_bit(0, false);
            let candidate = Integer::from(&cofactor * &q) + 1u32;
            if candidate.significant_bits() == modulus_bits
                && candidate.is_probably_prime(PRIMALITY_REPS) != IsPrime::No
            {
                break candidate;
            }
        };
        let cofactor = Integer::from(&p - 1u32) / &q;
        let two = Integer::from(2);
        let g = loop {
            let h = random_between(rng, &two, &p);
            let g = h.pow_mod(&cofactor, &p).map_err(|_| GroupError::InvalidGenerator)?;
            if g != 1 {
                break g;
            }
        };
        Self::new(&p, &q, &g)
    }

    pub fn generator(&self) -> &Integer {
        &self.g
    }

    /// A further generator g^a for random nonzero a; its discrete log with
    /// respect to g is discarded.
    pub fn random_generator<R: MutRandState>(&self, rng: &mut R) -> Integer {
        let a = random_between(rng, &Integer::from(1), &self.q);
        self.g.clone().pow_mod(&a, &self.p).unwrap_or_else(|_| self.g.clone())
    }
}

impl Group for SchnorrGroup {
    fn modulus(&self) -> &Integer {
        &self.p
    }
}

impl KnownOrderGroup for SchnorrGroup {
    fn order(&self) -> &Integer {
        &self.q
    }
}

#[cfg(test)]
mod test {
    use super::SchnorrGroup;
    use crate::group::{Group, GroupError, KnownOrderGroup};
    use crate::utils::test_fixtures::{schnorr_group, seeded_rng};
    use rug::Integer;

    #[test]
    fn test_fixed_group() {
        let group = schnorr_group();
        assert_eq!(group.modulus().significant_bits(), 512);
        assert_eq!(group.order().significant_bits(), 160);
        assert_eq!(group.exp(group.generator(), group.order()).unwrap(), 1);
    }

    #[test]
    fn test_exponent_arithmetic() {
        let group = schnorr_group();
        let q = group.order().clone();
        assert_eq!(group.add_exponents(&q, &Integer::from(5)), 5);
        assert_eq!(group.mul_exponents(&Integer::from(-1), &Integer::from(1)), Integer::from(&q - 1u32));
    }

    #[test]
    fn test_generate() {
        let mut rng = seeded_rng();
        let group = SchnorrGroup::generate(256, 64, &mut rng).unwrap();
        assert_eq!(group.modulus().significant_bits(), 256);
        assert_eq!(group.order().significant_bits(), 64);
        let h = group.random_generator(&mut rng);
        assert_eq!(group.exp(&h, group.order()).unwrap(), 1);
        SchnorrGroup::generate(64, 64, &mut rng).unwrap_err();
    }

    #[test]
    fn test_rejects_bad_generator() {
        let group = schnorr_group();
        match SchnorrGroup::new(group.modulus(), group.order(), &Integer::from(1)) {
            Err(GroupError::InvalidGenerator) => {}
            _ => panic!("identity accepted as generator"),
        }
    }
}
