//! Group arithmetic the protocols are built on. Elements are integers reduced
//! into `[0, modulus)`; exponents are arbitrary signed integers.
use rug::Integer;
use std::fmt::Debug;

pub mod rsa;
pub mod schnorr;

quick_error! {
    #[derive(Debug)]
    pub enum GroupError {
        NotPrime {}
        NotSafePrime {}
        InvalidGenerator {}
        InvalidParameters {}
    }
}

/// Rounds of Miller-Rabin used for every primality decision in the crate.
pub const PRIMALITY_REPS: u32 = 30;

/// Reduces `x` into `[0, modulus)`.
pub fn reduce(x: Integer, modulus: &Integer) -> Integer {
    let r = x % modulus;
    if r < 0 {
        r + modulus
    } else {
        r
    }
}

pub trait Group: Clone + Debug {
    fn modulus(&self) -> &Integer;

    fn identity(&self) -> Integer {
        Integer::from(1)
    }

    fn elem(&self, x: &Integer) -> Integer {
        reduce(x.clone(), self.modulus())
    }

    fn op(&self, a: &Integer, b: &Integer) -> Integer {
        reduce(Integer::from(a * b), self.modulus())
    }

    /// Fails with the original element when it shares a factor with the modulus.
    fn inv(&self, a: &Integer) -> Result<Integer, Integer> {
        self.elem(a).invert(self.modulus())
    }

    /// Signed exponentiation: `base^|e|`, inverted when `e` is negative.
    fn exp(&self, base: &Integer, e: &Integer) -> Result<Integer, Integer> {
        let abs = Integer::from(e.abs_ref());
        let power = match self.elem(base).pow_mod(&abs, self.modulus()) {
            Ok(power) => power,
            Err(_) => return Err(base.clone()),
        };
        if *e < 0 {
            self.inv(&power)
        } else {
            Ok(power)
        }
    }

    /// `base_1^e_1 * ... * base_k^e_k`, pairing bases and exponents positionally.
    fn multi_exp(&self, bases: &[Integer], exponents: &[Integer]) -> Result<Integer, Integer> {
        let mut acc = self.identity();
        for (base, e) in bases.iter().zip(exponents) {
            acc = self.op(&acc, &self.exp(base, e)?);
        }
        Ok(acc)
    }
}

/// A group whose order is unknown to (at least) the prover. Only an upper
/// bound is public.
pub trait HiddenOrderGroup: Group {
    fn order_upper_bound(&self) -> Integer;

    /// B: the order is below 2^B.
    fn order_bound_bits(&self) -> u32 {
        self.order_upper_bound().significant_bits()
    }

    fn modulus_bits(&self) -> u32 {
        self.modulus().significant_bits()
    }
}

/// A group whose order is known, so exponents can be reduced.
pub trait KnownOrderGroup: Group {
    fn order(&self) -> &Integer;

    fn add_exponents(&self, a: &Integer, b: &Integer) -> Integer {
        reduce(Integer::from(a + b), self.order())
    }

    fn mul_exponents(&self, a: &Integer, b: &Integer) -> Integer {
        reduce(Integer::from(a * b), self.order())
    }
}
