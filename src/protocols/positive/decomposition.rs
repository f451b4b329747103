//! Lipmaa's four-squares decomposition, x = r0^2 + r1^2 + r2^2 + r3^2, and
//! the matching split of commitment randomness.
use crate::{
    group::PRIMALITY_REPS,
    utils::{random_below, random_between},
};
use rug::integer::IsPrime;
use rug::rand::MutRandState;
use rug::Integer;
use tracing::trace;

/// Number of squares a non-negative integer is decomposed into.
pub const DECOMPOSITION_WIDTH: usize = 4;

/// Values up to this many bits are decomposed by exhaustive search.
const EXHAUSTIVE_SEARCH_BITS: u32 = 20;
const MAX_ATTEMPTS: usize = 100_000;
const SQRT_MINUS_ONE_ATTEMPTS: usize = 64;

quick_error! {
    #[derive(Debug)]
    pub enum DecompositionError {
        NegativeValue {
            display("only non-negative integers are sums of four squares")
        }
        NotFound {
            display("no four-squares decomposition found")
        }
    }
}

/// Returns r0, ..., r3 >= 0 with x = r0^2 + r1^2 + r2^2 + r3^2.
pub fn lipmaa_decomposition<R: MutRandState>(
    x: &Integer,
    rng: &mut R,
) -> Result<[Integer; DECOMPOSITION_WIDTH], DecompositionError> {
    if *x < 0 {
        return Err(DecompositionError::NegativeValue);
    }
    // x = 4^k * m with 4 not dividing m; the roots of m scale by 2^k.
    let k = x.find_one(0).map_or(0, |zeros| zeros / 2);
    let m = Integer::from(x >> (2 * k));
    let mut roots = decompose_unscaled(&m, rng)?;
    for root in roots.iter_mut() {
        *root <<= k;
    }
    Ok(roots)
}

/// Expects x >= 0 with 4 not dividing x unless x = 0. The randomized search
/// relies on it: for 4 | x no choice of w1, w2 leaves a prime 1 mod 4.
fn decompose_unscaled<R: MutRandState>(
    x: &Integer,
    rng: &mut R,
) -> Result<[Integer; DECOMPOSITION_WIDTH], DecompositionError> {
    if x.significant_bits() <= EXHAUSTIVE_SEARCH_BITS {
        let small = x.to_u64().ok_or(DecompositionError::NotFound)?;
        let [a, b, c, d] = exhaustive_search(small).ok_or(DecompositionError::NotFound)?;
        return Ok([Integer::from(a), Integer::from(b), Integer::from(c), Integer::from(d)]);
    }

    // Rabin–Shallit: pick w1, w2 until x - w1^2 - w2^2 is a sum of two
    // squares we can find quickly.
    let sqrt_x = Integer::from(x.sqrt_ref());
    for attempt in 0..MAX_ATTEMPTS {
        let w1 = random_below(rng, &Integer::from(&sqrt_x + 1u32));
        let rest = Integer::from(x - Integer::from(w1.square_ref()));
        let sqrt_rest = Integer::from(rest.sqrt_ref());
        let w2 = random_below(rng, &Integer::from(sqrt_rest + 1u32));
        let p = Integer::from(&rest - Integer::from(w2.square_ref()));
        if let Some((a, b)) = two_squares(&p, rng) {
            trace!(attempt, "four-squares decomposition found");
            return Ok([w1, w2, a, b]);
        }
    }

    Err(DecompositionError::NotFound)
}

fn isqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// Descending search with a >= b >= c; terminates quickly for small n.
fn exhaustive_search(n: u64) -> Option<[u64; DECOMPOSITION_WIDTH]> {
    let mut a = isqrt(n);
    loop {
        let rest_a = n - a * a;
        let mut b = isqrt(rest_a).min(a);
        loop {
            let rest_b = rest_a - b * b;
            let mut c = isqrt(rest_b).min(b);
            loop {
                let rest_c = rest_b - c * c;
                let d = isqrt(rest_c);
                if d * d == rest_c {
                    return Some([a, b, c, d]);
                }
                if c == 0 {
                    break;
                }
                c -= 1;
            }
            if b == 0 {
                break;
            }
            b -= 1;
        }
        if a == 0 {
            return None;
        }
        a -= 1;
    }
}

/// Writes p as a^2 + b^2 when p is a square, 2, or a prime congruent to 1 mod 4.
fn two_squares<R: MutRandState>(p: &Integer, rng: &mut R) -> Option<(Integer, Integer)> {
    if p.is_perfect_square() {
        return Some((Integer::from(p.sqrt_ref()), Integer::new()));
    }
    if *p == 2 {
        return Some((Integer::from(1), Integer::from(1)));
    }
    if p.mod_u(4) != 1 || p.is_probably_prime(PRIMALITY_REPS) == IsPrime::No {
        return None;
    }

    let u = sqrt_minus_one(p, rng)?;
    let p_minus_u = Integer::from(p - &u);
    let u = if p_minus_u < u { p_minus_u } else { u };

    // Hermite–Serret: the first two Euclidean remainders of (p, u) below
    // sqrt(p) are the roots.
    let mut a = p.clone();
    let mut b = u;
    while Integer::from(b.square_ref()) > *p {
        let r = Integer::from(&a % &b);
        a = b;
        b = r;
    }
    if b == 0 {
        return None;
    }
    let c = Integer::from(&a % &b);
    let sum = Integer::from(b.square_ref()) + Integer::from(c.square_ref());
    if sum == *p {
        Some((b, c))
    } else {
        None
    }
}

/// A square root of -1 modulo the prime p = 1 mod 4: c^((p-1)/4) for a
/// quadratic non-residue c, found with probability 1/2 per try.
fn sqrt_minus_one<R: MutRandState>(p: &Integer, rng: &mut R) -> Option<Integer> {
    let exponent = Integer::from(p - 1u32) >> 2u32;
    let two = Integer::from(2);
    let p_minus_one = Integer::from(p - 1u32);
    for _ in 0..SQRT_MINUS_ONE_ATTEMPTS {
        let c = random_between(rng, &two, &p_minus_one);
        let u = match c.pow_mod(&exponent, p) {
            Ok(u) => u,
            Err(_) => continue,
        };
        let square = Integer::from(u.square_ref()) % p;
        if square == p_minus_one {
            return Some(u);
        }
    }
    None
}

/// Splits `r` into `parts` integers summing exactly to `r`, all with the sign
/// of `r`. Zero parts is treated as one.
pub fn split_randomness<R: MutRandState>(r: &Integer, parts: usize, rng: &mut R) -> Vec<Integer> {
    let mut boundary = Integer::from(r.abs_ref());
    let mut shares = Vec::with_capacity(parts.max(1));
    for _ in 1..parts {
        let share = random_below(rng, &boundary);
        boundary -= &share;
        shares.push(share);
    }
    shares.push(boundary);

    if *r < 0 {
        for share in shares.iter_mut() {
            *share = Integer::from(-&*share);
        }
    }
    shares
}
