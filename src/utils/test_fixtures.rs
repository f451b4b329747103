//! Fixed groups so tests do not pay for prime generation.
use crate::{
    commitments::integer::IntegerCommitment,
    group::{rsa::RsaSpecialGroup, schnorr::SchnorrGroup},
    utils::{bytes_to_integer, integer_to_bytes, pow2},
};
use merlin::Transcript;
use rug::rand::RandState;
use rug::Integer;

pub const SAFE_PRIME_P: &str =
    "102447621178496959252901691682693962719718181732778162471179044921856419116039";
pub const SAFE_PRIME_Q: &str =
    "114581064253965622205772823896421623493785899203590146365993380383793907711043";

pub const SCHNORR_P: &str = "7907863342982487734949451599859680597400645885622358939393660453999027200476496933905418944941899766210160131869207547687843176225180938025909837739189391";
pub const SCHNORR_Q: &str = "922102747220720228348931512344354104584359738699";
pub const SCHNORR_G: &str = "2012080875623801615513236699847797271909593541661073359118532773436077604411557281379313448862184144841069869079944985826104483137749372728062466412203080";

pub const SECURITY_LEVEL: u16 = 80;
pub const CHALLENGE_BITS: u16 = 80;

pub fn seeded_rng() -> RandState<'static> {
    let mut rng = RandState::new();
    rng.seed(&Integer::from(13));
    rng
}

pub fn rsa_group() -> RsaSpecialGroup {
    RsaSpecialGroup::from_safe_primes(
        &SAFE_PRIME_P.parse().unwrap(),
        &SAFE_PRIME_Q.parse().unwrap(),
    )
    .unwrap()
}

pub fn schnorr_group() -> SchnorrGroup {
    SchnorrGroup::new(
        &SCHNORR_P.parse().unwrap(),
        &SCHNORR_Q.parse().unwrap(),
        &SCHNORR_G.parse().unwrap(),
    )
    .unwrap()
}

/// Commitment parameters over the fixed modulus with T = 2^128.
pub fn commitment_parameters(rng: &mut RandState<'_>) -> IntegerCommitment<RsaSpecialGroup> {
    IntegerCommitment::setup(&rsa_group(), &pow2(128), SECURITY_LEVEL, rng).unwrap()
}

/// Hash-derived challenge in [0, bound), computed outside the protocols the
/// way a Fiat–Shamir caller would before injecting it.
pub fn transcript_challenge(label: &'static [u8], elements: &[&Integer], bound: &Integer) -> Integer {
    let mut transcript = Transcript::new(label);
    transcript.append_message(b"dom-sep", label);
    for element in elements {
        transcript.append_message(b"element", &integer_to_bytes(element));
    }
    let mut buf = vec![0u8; (bound.significant_bits() as usize + 7) / 8 + 8];
    transcript.challenge_bytes(b"c", &mut buf);
    bytes_to_integer(&buf) % bound
}
