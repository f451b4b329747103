//! Generalized Schnorr proof of knowledge of a representation: given bases
//! g_1, ..., g_k and y, proves knowledge of x_1, ..., x_k with
//! y = g_1^x_1 * ... * g_k^x_k. With a single base this is the classic
//! discrete log proof.
//!
//! The group order is known here, so maskings and responses live in
//! [0, order). A prover must never answer two different challenges for the
//! same random data: the two responses reveal the secrets.
use crate::{
    group::KnownOrderGroup,
    protocols::{
        check_challenge, expect_prover_state, expect_verifier_state, outcome, ProofError,
        ProtocolState, VerificationError,
    },
    utils::random_below,
};
use rug::rand::MutRandState;
use rug::Integer;
use tracing::debug;

pub struct Prover<G: KnownOrderGroup> {
    pub group: G,
    secrets: Vec<Integer>,
    bases: Vec<Integer>,
    random_values: Option<Vec<Integer>>,
    state: ProtocolState,
}

/// All three messages, for when the challenge was derived by the prover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub proof_random_data: Integer,
    pub challenge: Integer,
    pub proof_data: Vec<Integer>,
}

impl<G: KnownOrderGroup> Prover<G> {
    pub fn new(group: &G, secrets: &[Integer], bases: &[Integer]) -> Result<Prover<G>, ProofError> {
        if secrets.len() != bases.len() {
            return Err(ProofError::SecretsBasesMismatch(secrets.len(), bases.len()));
        }
        Ok(Prover {
            group: group.clone(),
            secrets: secrets.to_vec(),
            bases: bases.iter().map(|b| group.elem(b)).collect(),
            random_values: None,
            state: ProtocolState::Init,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// t = g_1^r_1 * ... * g_k^r_k for fresh r_i in [0, order).
    pub fn get_proof_random_data<R: MutRandState>(&mut self, rng: &mut R) -> Result<Integer, ProofError> {
        expect_prover_state(self.state, ProtocolState::Init)?;
        let random_values = self
            .bases
            .iter()
            .map(|_| random_below(rng, self.group.order()))
            .collect::<Vec<_>>();
        let t = self.group.multi_exp(&self.bases, &random_values)?;
        self.random_values = Some(random_values);
        self.state = ProtocolState::RandomDataSent;
        Ok(t)
    }

    /// z_i = r_i + challenge * x_i mod order. The maskings are consumed.
    pub fn get_proof_data(&mut self, challenge: &Integer) -> Result<Vec<Integer>, ProofError> {
        expect_prover_state(self.state, ProtocolState::RandomDataSent)?;
        let random_values = self
            .random_values
            .take()
            .ok_or(ProofError::UnexpectedState(self.state))?;
        let proof_data = random_values
            .iter()
            .zip(&self.secrets)
            .map(|(r, x)| {
                let cx = self.group.mul_exponents(challenge, x);
                self.group.add_exponents(&cx, r)
            })
            .collect();
        self.state = ProtocolState::ResponseSent;
        Ok(proof_data)
    }
}

pub struct Verifier<G: KnownOrderGroup> {
    pub group: G,
    bases: Vec<Integer>,
    y: Integer,
    proof_random_data: Option<Integer>,
    challenge: Option<Integer>,
    state: ProtocolState,
}

impl<G: KnownOrderGroup> Verifier<G> {
    pub fn new(group: &G, bases: &[Integer], y: &Integer) -> Verifier<G> {
        Verifier {
            group: group.clone(),
            bases: bases.iter().map(|b| group.elem(b)).collect(),
            y: group.elem(y),
            proof_random_data: None,
            challenge: None,
            state: ProtocolState::Init,
        }
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn set_proof_random_data(&mut self, proof_random_data: &Integer) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::Init)?;
        self.proof_random_data = Some(self.group.elem(proof_random_data));
        self.state = ProtocolState::RandomDataSent;
        Ok(())
    }

    /// Samples the challenge from [0, order).
    pub fn get_challenge<R: MutRandState>(&mut self, rng: &mut R) -> Result<Integer, VerificationError> {
        let challenge = random_below(rng, self.group.order());
        self.set_challenge(&challenge)?;
        Ok(challenge)
    }

    /// Accepts an externally derived challenge, e.g. a transcript hash.
    pub fn set_challenge(&mut self, challenge: &Integer) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::RandomDataSent)?;
        check_challenge(challenge, self.group.order())?;
        self.challenge = Some(challenge.clone());
        self.state = ProtocolState::ChallengeSet;
        Ok(())
    }

    /// Checks g_1^z_1 * ... * g_k^z_k == t * y^challenge.
    pub fn verify(&mut self, proof_data: &[Integer]) -> Result<bool, VerificationError> {
        expect_verifier_state(self.state, ProtocolState::ChallengeSet)?;
        if proof_data.len() != self.bases.len() {
            return Err(VerificationError::LengthMismatch(self.bases.len(), proof_data.len()));
        }
        let (t, challenge) = match (&self.proof_random_data, &self.challenge) {
            (Some(t), Some(challenge)) => (t, challenge),
            _ => return Err(VerificationError::UnexpectedState(self.state)),
        };

        let left = self.group.multi_exp(&self.bases, proof_data)?;
        let right = self.group.op(&self.group.exp(&self.y, challenge)?, t);

        let accepted = left == right;
        self.state = outcome(accepted);
        debug!(bases = self.bases.len(), accepted, "representation proof verified");
        Ok(accepted)
    }

    /// Runs a fresh verifier over a complete transcript.
    pub fn verify_proof(group: &G, bases: &[Integer], y: &Integer, proof: &Proof) -> Result<bool, VerificationError> {
        let mut verifier = Verifier::new(group, bases, y);
        verifier.set_proof_random_data(&proof.proof_random_data)?;
        verifier.set_challenge(&proof.challenge)?;
        verifier.verify(&proof.proof_data)
    }
}

#[cfg(test)]
mod test {
    use super::{Proof, Prover, Verifier};
    use crate::group::{rsa::random_quadratic_residue, Group, KnownOrderGroup};
    use crate::protocols::{ProofError, ProtocolState, VerificationError};
    use crate::utils::{random_below, test_fixtures::{rsa_group, schnorr_group, seeded_rng, transcript_challenge}};
    use rug::Integer;

    fn setup(k: usize) -> (crate::group::schnorr::SchnorrGroup, Vec<Integer>, Vec<Integer>, Integer) {
        let mut rng = seeded_rng();
        let group = schnorr_group();
        let bases = (0..k).map(|_| group.random_generator(&mut rng)).collect::<Vec<_>>();
        let secrets = (0..k).map(|_| random_below(&mut rng, group.order())).collect::<Vec<_>>();
        let y = group.multi_exp(&bases, &secrets).unwrap();
        (group, bases, secrets, y)
    }

    #[test]
    fn test_dlog_knowledge() {
        let mut rng = seeded_rng();
        let (group, bases, secrets, y) = setup(1);

        let mut prover = Prover::new(&group, &secrets, &bases).unwrap();
        let mut verifier = Verifier::new(&group, &bases, &y);
        let t = prover.get_proof_random_data(&mut rng).unwrap();
        verifier.set_proof_random_data(&t).unwrap();
        let challenge = verifier.get_challenge(&mut rng).unwrap();
        let z = prover.get_proof_data(&challenge).unwrap();
        assert_eq!(z.len(), 1);
        assert!(verifier.verify(&z).unwrap());
        assert_eq!(verifier.state(), ProtocolState::Verified);
        assert_eq!(prover.state(), ProtocolState::ResponseSent);
    }

    #[test]
    fn test_representation_with_injected_challenge() {
        let mut rng = seeded_rng();
        let (group, bases, secrets, y) = setup(3);

        let mut prover = Prover::new(&group, &secrets, &bases).unwrap();
        let t = prover.get_proof_random_data(&mut rng).unwrap();
        let challenge = transcript_challenge(b"representation", &[&y, &t], group.order());
        let proof = Proof {
            proof_random_data: t,
            challenge: challenge.clone(),
            proof_data: prover.get_proof_data(&challenge).unwrap(),
        };
        assert!(Verifier::verify_proof(&group, &bases, &y, &proof).unwrap());
    }

    #[test]
    fn test_representation_over_qr_with_factorization() {
        let mut rng = seeded_rng();
        let group = rsa_group();
        let bases = (0..2).map(|_| random_quadratic_residue(&group, &mut rng)).collect::<Vec<_>>();
        let secrets = vec![Integer::from(1234), Integer::from(98765)];
        let y = group.multi_exp(&bases, &secrets).unwrap();

        let mut prover = Prover::new(&group, &secrets, &bases).unwrap();
        let mut verifier = Verifier::new(&group, &bases, &y);
        verifier.set_proof_random_data(&prover.get_proof_random_data(&mut rng).unwrap()).unwrap();
        let challenge = verifier.get_challenge(&mut rng).unwrap();
        assert!(verifier.verify(&prover.get_proof_data(&challenge).unwrap()).unwrap());
    }

    #[test]
    fn test_tampering_rejected() {
        let mut rng = seeded_rng();
        let (group, bases, secrets, y) = setup(3);

        let mut prover = Prover::new(&group, &secrets, &bases).unwrap();
        let t = prover.get_proof_random_data(&mut rng).unwrap();
        let challenge = random_below(&mut rng, group.order());
        let z = prover.get_proof_data(&challenge).unwrap();
        let proof = Proof {
            proof_random_data: t,
            challenge: challenge.clone(),
            proof_data: z,
        };
        assert!(Verifier::verify_proof(&group, &bases, &y, &proof).unwrap());

        for i in 0..proof.proof_data.len() {
            let mut tampered = proof.clone();
            tampered.proof_data[i] = group.add_exponents(&tampered.proof_data[i], &Integer::from(1));
            assert!(!Verifier::verify_proof(&group, &bases, &y, &tampered).unwrap());
        }

        let mut wrong_challenge = proof.clone();
        wrong_challenge.challenge = group.add_exponents(&challenge, &Integer::from(1));
        assert!(!Verifier::verify_proof(&group, &bases, &y, &wrong_challenge).unwrap());

        let wrong_y = group.op(&y, group.generator());
        assert!(!Verifier::verify_proof(&group, &bases, &wrong_y, &proof).unwrap());
    }

    #[test]
    fn test_configuration_errors() {
        let (group, bases, secrets, y) = setup(2);
        match Prover::new(&group, &secrets[..1], &bases) {
            Err(ProofError::SecretsBasesMismatch(1, 2)) => {}
            _ => panic!("mismatched lengths accepted"),
        }

        let mut rng = seeded_rng();
        let mut prover = Prover::new(&group, &secrets, &bases).unwrap();
        let mut verifier = Verifier::new(&group, &bases, &y);
        verifier.set_proof_random_data(&prover.get_proof_random_data(&mut rng).unwrap()).unwrap();
        let challenge = verifier.get_challenge(&mut rng).unwrap();
        let z = prover.get_proof_data(&challenge).unwrap();
        match verifier.verify(&z[..1]) {
            Err(VerificationError::LengthMismatch(2, 1)) => {}
            _ => panic!("short response accepted"),
        }
        match verifier.set_challenge(group.order()) {
            Err(VerificationError::UnexpectedState(ProtocolState::ChallengeSet)) => {}
            _ => panic!("challenge set twice"),
        }
    }

    #[test]
    fn test_out_of_order_calls() {
        let mut rng = seeded_rng();
        let (group, bases, secrets, y) = setup(1);

        let mut prover = Prover::new(&group, &secrets, &bases).unwrap();
        match prover.get_proof_data(&Integer::from(1)) {
            Err(ProofError::UnexpectedState(ProtocolState::Init)) => {}
            _ => panic!("response before random data"),
        }
        let t = prover.get_proof_random_data(&mut rng).unwrap();
        prover.get_proof_data(&Integer::from(1)).unwrap();
        match prover.get_proof_data(&Integer::from(2)) {
            Err(ProofError::UnexpectedState(ProtocolState::ResponseSent)) => {}
            _ => panic!("second response for the same random data"),
        }

        let mut verifier = Verifier::new(&group, &bases, &y);
        match verifier.get_challenge(&mut rng) {
            Err(VerificationError::UnexpectedState(ProtocolState::Init)) => {}
            _ => panic!("challenge before random data"),
        }
        match verifier.verify(&[Integer::from(1)]) {
            Err(VerificationError::UnexpectedState(ProtocolState::Init)) => {}
            _ => panic!("verify before random data"),
        }
        verifier.set_proof_random_data(&t).unwrap();
        match verifier.verify(&[Integer::from(1)]) {
            Err(VerificationError::UnexpectedState(ProtocolState::RandomDataSent)) => {}
            _ => panic!("verify before challenge"),
        }
        match verifier.set_challenge(group.order()) {
            Err(VerificationError::ChallengeOutOfRange) => {}
            _ => panic!("challenge outside [0, q) accepted"),
        }
    }
}
