//! Damgård–Fujisaki integer commitments c = G^x * H^r mod N.
//!
//! Values and randomness are kept as exact integers; nothing here is reduced
//! modulo the (unknown) group order.
use crate::{
    commitments::{Commitment, CommitmentError},
    group::{rsa::random_quadratic_residue, HiddenOrderGroup},
    utils::{pow2, random_below},
};
use rug::rand::MutRandState;
use rug::Integer;

#[derive(Clone, Debug)]
pub struct IntegerCommitment<G: HiddenOrderGroup> {
    pub group: G,
    pub g: Integer,
    pub h: Integer,
    /// Committed values must satisfy |x| <= t.
    pub t: Integer,
    /// Security parameter K: randomness is drawn from [0, 2^(B+K)).
    pub k: u16,
}

impl<G: HiddenOrderGroup> IntegerCommitment<G> {
    /// Picks H as a random square and G = H^alpha for a random alpha, so both
    /// generate the same subgroup of QR_N.
    pub fn setup<R: MutRandState>(
        group: &G,
        t: &Integer,
        k: u16,
        rng: &mut R,
    ) -> Result<IntegerCommitment<G>, CommitmentError> {
        let h = random_quadratic_residue(group, rng);
        let alpha_bound = pow2(group.order_bound_bits() + k as u32);
        let g = loop {
            let alpha = random_below(rng, &alpha_bound);
            let g = group.exp(&h, &alpha)?;
            if g != 1 {
                break g;
            }
        };
        Ok(IntegerCommitment {
            group: group.clone(),
            g,
            h,
            t: t.clone(),
            k,
        })
    }

    pub fn new(group: &G, g: &Integer, h: &Integer, t: &Integer, k: u16) -> IntegerCommitment<G> {
        IntegerCommitment {
            group: group.clone(),
            g: g.clone(),
            h: h.clone(),
            t: t.clone(),
            k,
        }
    }

    /// B, the bit length bound of the group order.
    pub fn b(&self) -> u32 {
        self.group.order_bound_bits()
    }

    /// 2^(B+K), the exclusive bound for commitment randomness.
    pub fn randomness_bound(&self) -> Integer {
        pow2(self.b() + self.k as u32)
    }

    pub fn check_bound(&self, value: &Integer) -> Result<(), CommitmentError> {
        if Integer::from(value.abs_ref()) > self.t {
            Err(CommitmentError::IntegerTooBig)
        } else {
            Ok(())
        }
    }
}

impl<G: HiddenOrderGroup> Commitment for IntegerCommitment<G> {
    type Instance = Integer;

    fn commit(&self, value: &Integer, randomness: &Integer) -> Result<Self::Instance, CommitmentError> {
        Ok(self.group.op(
            &self.group.exp(&self.g, value)?,
            &self.group.exp(&self.h, randomness)?,
        ))
    }

    fn open(&self, commitment: &Self::Instance, value: &Integer, randomness: &Integer) -> Result<(), CommitmentError> {
        let expected = self.commit(value, randomness)?;
        if expected == self.group.elem(commitment) {
            Ok(())
        } else {
            Err(CommitmentError::WrongOpening)
        }
    }
}

/// Holds a witness (value, randomness) and the commitment to it.
#[derive(Clone)]
pub struct Committer<G: HiddenOrderGroup> {
    pub parameters: IntegerCommitment<G>,
    opening: Option<(Integer, Integer)>,
    commitment: Option<Integer>,
}

impl<G: HiddenOrderGroup> Committer<G> {
    pub fn new(parameters: &IntegerCommitment<G>) -> Committer<G> {
        Committer {
            parameters: parameters.clone(),
            opening: None,
            commitment: None,
        }
    }

    /// Commits to `value` with fresh randomness from [0, 2^(B+K)).
    pub fn get_commit_msg<R: MutRandState>(
        &mut self,
        value: &Integer,
        rng: &mut R,
    ) -> Result<Integer, CommitmentError> {
        let randomness = random_below(rng, &self.parameters.randomness_bound());
        self.get_commit_msg_with_given_r(value, &randomness)
    }

    /// Commits to `value` with caller-chosen randomness, which may be negative.
    pub fn get_commit_msg_with_given_r(
        &mut self,
        value: &Integer,
        randomness: &Integer,
    ) -> Result<Integer, CommitmentError> {
        self.parameters.check_bound(value)?;
        let commitment = self.parameters.commit(value, randomness)?;
        self.opening = Some((value.clone(), randomness.clone()));
        self.commitment = Some(commitment.clone());
        Ok(commitment)
    }

    pub fn get_decommit_msg(&self) -> Result<(&Integer, &Integer), CommitmentError> {
        self.opening
            .as_ref()
            .map(|(value, randomness)| (value, randomness))
            .ok_or(CommitmentError::NotCommitted)
    }

    pub fn commitment(&self) -> Result<&Integer, CommitmentError> {
        self.commitment.as_ref().ok_or(CommitmentError::NotCommitted)
    }

    /// G^value * H^randomness without storing anything.
    pub fn compute_commit(&self, value: &Integer, randomness: &Integer) -> Result<Integer, CommitmentError> {
        self.parameters.commit(value, randomness)
    }
}

/// Holds only public values: the parameters and, once received, a commitment.
#[derive(Clone, Debug)]
pub struct Receiver<G: HiddenOrderGroup> {
    pub parameters: IntegerCommitment<G>,
    commitment: Option<Integer>,
}

impl<G: HiddenOrderGroup> Receiver<G> {
    pub fn new(parameters: &IntegerCommitment<G>) -> Receiver<G> {
        Receiver {
            parameters: parameters.clone(),
            commitment: None,
        }
    }

    pub fn with_commitment(parameters: &IntegerCommitment<G>, commitment: &Integer) -> Receiver<G> {
        let mut receiver = Receiver::new(parameters);
        receiver.set_commitment(commitment);
        receiver
    }

    pub fn set_commitment(&mut self, commitment: &Integer) {
        self.commitment = Some(self.parameters.group.elem(commitment));
    }

    pub fn commitment(&self) -> Result<&Integer, CommitmentError> {
        self.commitment.as_ref().ok_or(CommitmentError::NotCommitted)
    }

    pub fn compute_commit(&self, value: &Integer, randomness: &Integer) -> Result<Integer, CommitmentError> {
        self.parameters.commit(value, randomness)
    }

    pub fn check_decommitment(&self, value: &Integer, randomness: &Integer) -> Result<bool, CommitmentError> {
        let commitment = self.commitment()?;
        match self.parameters.open(commitment, value, randomness) {
            Ok(()) => Ok(true),
            Err(CommitmentError::WrongOpening) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Committer, Receiver};
    use crate::commitments::{Commitment, CommitmentError};
    use crate::group::Group;
    use crate::utils::test_fixtures::{commitment_parameters, seeded_rng};
    use rug::Integer;

    #[test]
    fn test_simple_commitment() {
        let mut rng = seeded_rng();

        let value = Integer::from(2);
        let randomness = Integer::from(5);
        let integer = commitment_parameters(&mut rng);
        let commitment = integer.commit(&value, &randomness).unwrap();
        integer.open(&commitment, &value, &randomness).unwrap();
        let wrong_value = Integer::from(5);
        integer.open(&commitment, &wrong_value, &randomness).unwrap_err();
        let wrong_randomness = Integer::from(7);
        integer.open(&commitment, &value, &wrong_randomness).unwrap_err();
        integer.open(&commitment, &wrong_value, &wrong_randomness).unwrap_err();
    }

    #[test]
    fn test_negative_randomness() {
        let mut rng = seeded_rng();
        let integer = commitment_parameters(&mut rng);
        let value = Integer::from(-3);
        let randomness = Integer::from(-11);
        let commitment = integer.commit(&value, &randomness).unwrap();
        let g_inv = integer.group.inv(&integer.g).unwrap();
        let h_inv = integer.group.inv(&integer.h).unwrap();
        let expected = integer.group.op(
            &integer.group.exp(&g_inv, &Integer::from(3)).unwrap(),
            &integer.group.exp(&h_inv, &Integer::from(11)).unwrap(),
        );
        assert_eq!(commitment, expected);
    }

    #[test]
    fn test_committer_receiver() {
        let mut rng = seeded_rng();
        let parameters = commitment_parameters(&mut rng);
        let mut committer = Committer::new(&parameters);
        match committer.get_decommit_msg() {
            Err(CommitmentError::NotCommitted) => {}
            _ => panic!("decommitment before commitment"),
        }

        let commitment = committer.get_commit_msg(&Integer::from(42), &mut rng).unwrap();
        let (value, randomness) = committer.get_decommit_msg().unwrap();
        assert_eq!(*value, 42);
        assert!(*randomness >= 0 && *randomness < parameters.randomness_bound());

        let receiver = Receiver::with_commitment(&parameters, &commitment);
        assert!(receiver.check_decommitment(value, randomness).unwrap());
        assert!(!receiver.check_decommitment(&Integer::from(43), randomness).unwrap());
        assert_eq!(receiver.compute_commit(value, randomness).unwrap(), commitment);
    }

    #[test]
    fn test_bound() {
        let mut rng = seeded_rng();
        let parameters = commitment_parameters(&mut rng);
        let mut committer = Committer::new(&parameters);
        let too_big = Integer::from(&parameters.t + 1u32);
        match committer.get_commit_msg_with_given_r(&too_big, &Integer::from(1)) {
            Err(CommitmentError::IntegerTooBig) => {}
            _ => panic!("value above T accepted"),
        }
        committer
            .get_commit_msg_with_given_r(&parameters.t, &Integer::from(1))
            .unwrap();
    }
}
