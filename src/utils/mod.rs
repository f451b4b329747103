use rand::{rngs::OsRng, RngCore};
use rug::integer::Order;
use rug::rand::{MutRandState, RandGen};
use rug::Integer;

#[cfg(test)]
pub(crate) mod test_fixtures;

/// Operating system randomness exposed as a `rug` generator, so a secure
/// source can be used wherever a `MutRandState` is expected:
///
/// ```
/// use df_sigma::utils::OsRandGen;
/// use rug::rand::RandState;
///
/// let mut gen = OsRandGen;
/// let mut rng = RandState::new_custom(&mut gen);
/// # let _ = &mut rng;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandGen;

impl RandGen for OsRandGen {
    fn gen(&mut self) -> u32 {
        OsRng.next_u32()
    }

    fn boxed_clone(&self) -> Option<Box<dyn RandGen>> {
        Some(Box::new(OsRandGen))
    }
}

/// Uniform integer in `[0, bound)`. A non-positive bound yields 0.
pub fn random_below<R: MutRandState>(rng: &mut R, bound: &Integer) -> Integer {
    if *bound <= 0 {
        return Integer::new();
    }
    bound.clone().random_below(rng)
}

/// Uniform integer in `[0, 2^bits)`.
pub fn random_bits<R: MutRandState>(rng: &mut R, bits: u32) -> Integer {
    Integer::from(Integer::random_bits(bits, rng))
}

pub fn random_between<R: MutRandState>(rng: &mut R, min: &Integer, max: &Integer) -> Integer {
    min + random_below(rng, &Integer::from(max - min))
}

pub fn random_symmetric_range<R: MutRandState>(rng: &mut R, max: &Integer) -> Integer {
    Integer::from(-max) + random_below(rng, &Integer::from(2 * max))
}

/// `2^exp` as an integer.
pub fn pow2(exp: u32) -> Integer {
    Integer::from(Integer::u_pow_u(2, exp))
}

pub fn integer_to_bytes(num: &Integer) -> Vec<u8> {
    let digits = num.significant_digits::<u8>();
    let mut bytes = vec![0u8; digits];
    num.write_digits(&mut bytes, Order::MsfBe);
    bytes
}

pub fn bytes_to_integer(bytes: &[u8]) -> Integer {
    let mut big = Integer::from(0);
    big.assign_digits(bytes, Order::MsfBe);
    big
}

#[cfg(test)]
mod test {
    use super::{bytes_to_integer, integer_to_bytes, random_below, random_between, random_symmetric_range, OsRandGen};
    use rug::rand::RandState;
    use rug::Integer;

    #[test]
    fn test_back_and_forth() {
        let int = Integer::from(2493823);
        let bytes = integer_to_bytes(&int);
        assert_eq!(bytes, vec![0x26, 0x0d, 0x7f]);
        assert_eq!(bytes_to_integer(&bytes), int);
    }

    #[test]
    fn test_ranges() {
        let mut rng = RandState::new();
        rng.seed(&Integer::from(13));

        assert_eq!(random_below(&mut rng, &Integer::new()), 0);
        assert_eq!(random_below(&mut rng, &Integer::from(-5)), 0);

        let min = Integer::from(-10);
        let max = Integer::from(10);
        for _ in 0..100 {
            let r = random_between(&mut rng, &min, &max);
            assert!(r >= min && r < max);
            let s = random_symmetric_range(&mut rng, &max);
            assert!(s >= min && s < max);
        }
    }

    #[test]
    fn test_os_rand_gen() {
        let mut gen = OsRandGen;
        let mut rng = RandState::new_custom(&mut gen);
        let bound = Integer::from(1000);
        let r = random_below(&mut rng, &bound);
        assert!(r >= 0 && r < bound);
    }
}
