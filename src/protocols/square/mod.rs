//! Proof that a commitment hides a perfect square, the building block of the
//! positive-number proof.
//!
//! The positive proof depends only on the [`SquareProof`] seam; [`DfSquareProof`]
//! is the Damgård–Fujisaki instantiation. For c = G^(a^2) H^r the prover
//! commits to the root, c1 = G^a H^r1, and shows it can open c1 and
//! c = c1^a H^(r - a*r1) with the same a.
use crate::{
    commitments::{
        integer::{Committer, IntegerCommitment, Receiver},
        Commitment, CommitmentError,
    },
    group::HiddenOrderGroup,
    protocols::{
        challenge_bound, check_challenge, expect_prover_state, expect_verifier_state,
        multiplication::masking_bounds, outcome, ProofError, ProtocolState, VerificationError,
    },
    utils::random_below,
};
use rug::rand::MutRandState;
use rug::Integer;

/// Random data of one square proof: d1 = G^y H^s1, d2 = c1^y H^s2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareRandomData {
    pub d1: Integer,
    pub d2: Integer,
}

/// Responses of one square proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareProofData {
    pub s1: Integer,
    pub s21: Integer,
    pub s22: Integer,
}

impl SquareRandomData {
    pub const WIDTH: usize = 2;

    pub fn to_vec(&self) -> Vec<Integer> {
        vec![self.d1.clone(), self.d2.clone()]
    }

    /// Expects exactly [`Self::WIDTH`] elements.
    pub fn from_slice(elements: &[Integer]) -> Option<SquareRandomData> {
        match elements {
            [d1, d2] => Some(SquareRandomData {
                d1: d1.clone(),
                d2: d2.clone(),
            }),
            _ => None,
        }
    }
}

impl SquareProofData {
    pub const WIDTH: usize = 3;

    pub fn to_vec(&self) -> Vec<Integer> {
        vec![self.s1.clone(), self.s21.clone(), self.s22.clone()]
    }

    /// Expects exactly [`Self::WIDTH`] elements.
    pub fn from_slice(elements: &[Integer]) -> Option<SquareProofData> {
        match elements {
            [s1, s21, s22] => Some(SquareProofData {
                s1: s1.clone(),
                s21: s21.clone(),
                s22: s22.clone(),
            }),
            _ => None,
        }
    }
}

pub trait SquareProver<G: HiddenOrderGroup> {
    /// Commitment to the root, needed by the verifier.
    fn small_commitment(&self) -> &Integer;
    fn get_proof_random_data<R: MutRandState>(&mut self, rng: &mut R) -> Result<SquareRandomData, ProofError>;
    fn get_proof_data(&mut self, challenge: &Integer) -> Result<SquareProofData, ProofError>;
}

pub trait SquareVerifier<G: HiddenOrderGroup> {
    fn set_proof_random_data(&mut self, proof_random_data: &SquareRandomData) -> Result<(), VerificationError>;
    fn get_challenge<R: MutRandState>(&mut self, rng: &mut R) -> Result<Integer, VerificationError>;
    fn set_challenge(&mut self, challenge: &Integer) -> Result<(), VerificationError>;
    fn verify(&mut self, proof_data: &SquareProofData) -> Result<bool, VerificationError>;
}

pub trait SquareProof<G: HiddenOrderGroup> {
    type Prover: SquareProver<G>;
    type Verifier: SquareVerifier<G>;

    /// `committer` holds c = G^(root^2) H^r.
    fn prover<R: MutRandState>(
        committer: &Committer<G>,
        root: &Integer,
        challenge_bits: u16,
        rng: &mut R,
    ) -> Result<Self::Prover, ProofError>;

    /// `receiver` holds the big commitment c.
    fn verifier(
        receiver: &Receiver<G>,
        small_commitment: &Integer,
        challenge_bits: u16,
    ) -> Result<Self::Verifier, VerificationError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DfSquareProof;

impl<G: HiddenOrderGroup> SquareProof<G> for DfSquareProof {
    type Prover = DfSquareProver<G>;
    type Verifier = DfSquareVerifier<G>;

    fn prover<R: MutRandState>(
        committer: &Committer<G>,
        root: &Integer,
        challenge_bits: u16,
        rng: &mut R,
    ) -> Result<Self::Prover, ProofError> {
        DfSquareProver::new(committer, root, challenge_bits, rng)
    }

    fn verifier(
        receiver: &Receiver<G>,
        small_commitment: &Integer,
        challenge_bits: u16,
    ) -> Result<Self::Verifier, VerificationError> {
        DfSquareVerifier::new(receiver, small_commitment, challenge_bits)
    }
}

struct Maskings {
    y: Integer,
    s1: Integer,
    s2: Integer,
}

pub struct DfSquareProver<G: HiddenOrderGroup> {
    committer: Committer<G>,
    small_committer: Committer<G>,
    small_commitment: Integer,
    root: Integer,
    challenge_bits: u16,
    maskings: Option<Maskings>,
    state: ProtocolState,
}

/// Parameters with c1 in place of G, as used for the second opening.
fn rebased<G: HiddenOrderGroup>(parameters: &IntegerCommitment<G>, base: &Integer) -> IntegerCommitment<G> {
    IntegerCommitment::new(&parameters.group, base, &parameters.h, &parameters.t, parameters.k)
}

impl<G: HiddenOrderGroup> DfSquareProver<G> {
    pub fn new<R: MutRandState>(
        committer: &Committer<G>,
        root: &Integer,
        challenge_bits: u16,
        rng: &mut R,
    ) -> Result<DfSquareProver<G>, ProofError> {
        let (value, _) = committer.get_decommit_msg()?;
        if *value != Integer::from(root.square_ref()) {
            return Err(CommitmentError::WrongOpening.into());
        }
        let mut small_committer = Committer::new(&committer.parameters);
        let small_commitment = small_committer.get_commit_msg(root, rng)?;
        Ok(DfSquareProver {
            committer: committer.clone(),
            small_committer,
            small_commitment,
            root: root.clone(),
            challenge_bits,
            maskings: None,
            state: ProtocolState::Init,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }
}

impl<G: HiddenOrderGroup> SquareProver<G> for DfSquareProver<G> {
    fn small_commitment(&self) -> &Integer {
        &self.small_commitment
    }

    fn get_proof_random_data<R: MutRandState>(&mut self, rng: &mut R) -> Result<SquareRandomData, ProofError> {
        expect_prover_state(self.state, ProtocolState::Init)?;
        let parameters = &self.committer.parameters;
        let (value_bound, randomness_bound) = masking_bounds(parameters, self.challenge_bits);
        let maskings = Maskings {
            y: random_below(rng, &value_bound),
            s1: random_below(rng, &randomness_bound),
            s2: random_below(rng, &randomness_bound),
        };

        let d1 = parameters.commit(&maskings.y, &maskings.s1)?;
        let d2 = rebased(parameters, &self.small_commitment).commit(&maskings.y, &maskings.s2)?;

        self.maskings = Some(maskings);
        self.state = ProtocolState::RandomDataSent;
        Ok(SquareRandomData { d1, d2 })
    }

    fn get_proof_data(&mut self, challenge: &Integer) -> Result<SquareProofData, ProofError> {
        expect_prover_state(self.state, ProtocolState::RandomDataSent)?;
        let maskings = self
            .maskings
            .take()
            .ok_or(ProofError::UnexpectedState(self.state))?;
        let (_, r) = self.committer.get_decommit_msg()?;
        let (_, r1) = self.small_committer.get_decommit_msg()?;

        let s1 = maskings.y + Integer::from(challenge * &self.root);
        let s21 = maskings.s1 + Integer::from(challenge * r1);
        let r_rest = Integer::from(r - Integer::from(&self.root * r1));
        let s22 = maskings.s2 + Integer::from(challenge * &r_rest);

        self.state = ProtocolState::ResponseSent;
        Ok(SquareProofData { s1, s21, s22 })
    }
}

pub struct DfSquareVerifier<G: HiddenOrderGroup> {
    parameters: IntegerCommitment<G>,
    commitment: Integer,
    small_commitment: Integer,
    challenge_bits: u16,
    proof_random_data: Option<SquareRandomData>,
    challenge: Option<Integer>,
    state: ProtocolState,
}

impl<G: HiddenOrderGroup> DfSquareVerifier<G> {
    pub fn new(
        receiver: &Receiver<G>,
        small_commitment: &Integer,
        challenge_bits: u16,
    ) -> Result<DfSquareVerifier<G>, VerificationError> {
        Ok(DfSquareVerifier {
            parameters: receiver.parameters.clone(),
            commitment: receiver.commitment()?.clone(),
            small_commitment: receiver.parameters.group.elem(small_commitment),
            challenge_bits,
            proof_random_data: None,
            challenge: None,
            state: ProtocolState::Init,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }
}

impl<G: HiddenOrderGroup> SquareVerifier<G> for DfSquareVerifier<G> {
    fn set_proof_random_data(&mut self, proof_random_data: &SquareRandomData) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::Init)?;
        self.proof_random_data = Some(proof_random_data.clone());
        self.state = ProtocolState::RandomDataSent;
        Ok(())
    }

    fn get_challenge<R: MutRandState>(&mut self, rng: &mut R) -> Result<Integer, VerificationError> {
        let challenge = random_below(rng, &challenge_bound(self.challenge_bits));
        self.set_challenge(&challenge)?;
        Ok(challenge)
    }

    fn set_challenge(&mut self, challenge: &Integer) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::RandomDataSent)?;
        check_challenge(challenge, &challenge_bound(self.challenge_bits))?;
        self.challenge = Some(challenge.clone());
        self.state = ProtocolState::ChallengeSet;
        Ok(())
    }

    /// Checks G^s1 H^s21 = d1 c1^e and c1^s1 H^s22 = d2 c^e.
    fn verify(&mut self, proof_data: &SquareProofData) -> Result<bool, VerificationError> {
        expect_verifier_state(self.state, ProtocolState::ChallengeSet)?;
        let (random_data, challenge) = match (&self.proof_random_data, &self.challenge) {
            (Some(random_data), Some(challenge)) => (random_data, challenge),
            _ => return Err(VerificationError::UnexpectedState(self.state)),
        };
        let group = &self.parameters.group;

        let left1 = self.parameters.commit(&proof_data.s1, &proof_data.s21)?;
        let right1 = group.op(&random_data.d1, &group.exp(&self.small_commitment, challenge)?);

        let left2 = rebased(&self.parameters, &self.small_commitment).commit(&proof_data.s1, &proof_data.s22)?;
        let right2 = group.op(&random_data.d2, &group.exp(&self.commitment, challenge)?);

        let accepted = left1 == right1 && left2 == right2;
        self.state = outcome(accepted);
        Ok(accepted)
    }
}
