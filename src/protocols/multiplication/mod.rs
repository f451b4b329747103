//! Proves that three commitments c1 = G^x1 H^r1, c2 = G^x2 H^r2 and
//! c3 = G^x3 H^r3 satisfy x3 = x1 * x2.
//!
//! c3 is rewritten with c1 as a base: c3 = c1^x2 * H^(r3 - r1*x2). The proof
//! then opens c1, c2 and c3 in parallel, using one masking for x2 in the
//! second and third openings. All responses are computed over the integers.
use crate::{
    commitments::{
        integer::{Committer, IntegerCommitment, Receiver},
        Commitment,
    },
    group::HiddenOrderGroup,
    protocols::{
        challenge_bound, check_challenge, expect_prover_state, expect_verifier_state, outcome,
        ProofError, ProtocolState, VerificationError,
    },
    utils::{pow2, random_below},
};
use rug::rand::MutRandState;
use rug::Integer;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofRandomData {
    pub d1: Integer,
    pub d2: Integer,
    pub d3: Integer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofData {
    pub u1: Integer,
    pub u: Integer,
    pub v1: Integer,
    pub v2: Integer,
    pub v3: Integer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub proof_random_data: ProofRandomData,
    pub challenge: Integer,
    pub proof_data: ProofData,
}

struct Maskings {
    y1: Integer,
    y: Integer,
    s1: Integer,
    s2: Integer,
    s3: Integer,
}

/// Masking bounds (T * 2^(|N| + challenge_bits), 2^(B + 2|N| + challenge_bits))
/// for values and randomness respectively.
pub(crate) fn masking_bounds<G: HiddenOrderGroup>(
    parameters: &IntegerCommitment<G>,
    challenge_bits: u16,
) -> (Integer, Integer) {
    let n_len = parameters.group.modulus_bits();
    let cs = challenge_bits as u32;
    let value_bound = Integer::from(&parameters.t * pow2(n_len + cs));
    let randomness_bound = pow2(parameters.b() + 2 * n_len + cs);
    (value_bound, randomness_bound)
}

pub struct MultiplicationProver<G: HiddenOrderGroup> {
    committer1: Committer<G>,
    committer2: Committer<G>,
    committer3: Committer<G>,
    challenge_bits: u16,
    maskings: Option<Maskings>,
    state: ProtocolState,
}

impl<G: HiddenOrderGroup> MultiplicationProver<G> {
    /// All three committers must already hold their openings.
    pub fn new(
        committer1: &Committer<G>,
        committer2: &Committer<G>,
        committer3: &Committer<G>,
        challenge_bits: u16,
    ) -> Result<MultiplicationProver<G>, ProofError> {
        for committer in &[committer1, committer2, committer3] {
            committer.get_decommit_msg()?;
        }
        Ok(MultiplicationProver {
            committer1: committer1.clone(),
            committer2: committer2.clone(),
            committer3: committer3.clone(),
            challenge_bits,
            maskings: None,
            state: ProtocolState::Init,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// d1 = G^y1 H^s1, d2 = G^y H^s2, d3 = c1^y H^s3.
    pub fn get_proof_random_data<R: MutRandState>(
        &mut self,
        rng: &mut R,
    ) -> Result<ProofRandomData, ProofError> {
        expect_prover_state(self.state, ProtocolState::Init)?;
        let parameters = &self.committer1.parameters;
        let (value_bound, randomness_bound) = masking_bounds(parameters, self.challenge_bits);

        let maskings = Maskings {
            y1: random_below(rng, &value_bound),
            y: random_below(rng, &value_bound),
            s1: random_below(rng, &randomness_bound),
            s2: random_below(rng, &randomness_bound),
            s3: random_below(rng, &randomness_bound),
        };

        let d1 = parameters.commit(&maskings.y1, &maskings.s1)?;
        let d2 = parameters.commit(&maskings.y, &maskings.s2)?;
        let c1 = self.committer1.commitment()?;
        let integer_commitment_d3 = IntegerCommitment::<G>::new(
            &parameters.group,
            c1,
            &parameters.h,
            &parameters.t,
            parameters.k,
        );
        let d3 = integer_commitment_d3.commit(&maskings.y, &maskings.s3)?;

        self.maskings = Some(maskings);
        self.state = ProtocolState::RandomDataSent;
        Ok(ProofRandomData { d1, d2, d3 })
    }

    pub fn get_proof_data(&mut self, challenge: &Integer) -> Result<ProofData, ProofError> {
        expect_prover_state(self.state, ProtocolState::RandomDataSent)?;
        let maskings = self
            .maskings
            .take()
            .ok_or(ProofError::UnexpectedState(self.state))?;
        let (x1, r1) = self.committer1.get_decommit_msg()?;
        let (x2, r2) = self.committer2.get_decommit_msg()?;
        let (_, r3) = self.committer3.get_decommit_msg()?;

        let u1 = maskings.y1 + Integer::from(challenge * x1);
        let u = maskings.y + Integer::from(challenge * x2);
        let v1 = maskings.s1 + Integer::from(challenge * r1);
        let v2 = maskings.s2 + Integer::from(challenge * r2);
        let r = Integer::from(r3 - Integer::from(x2 * r1));
        let v3 = maskings.s3 + Integer::from(challenge * &r);

        self.state = ProtocolState::ResponseSent;
        Ok(ProofData { u1, u, v1, v2, v3 })
    }
}

pub struct MultiplicationVerifier<G: HiddenOrderGroup> {
    parameters: IntegerCommitment<G>,
    c1: Integer,
    c2: Integer,
    c3: Integer,
    challenge_bits: u16,
    proof_random_data: Option<ProofRandomData>,
    challenge: Option<Integer>,
    state: ProtocolState,
}

impl<G: HiddenOrderGroup> MultiplicationVerifier<G> {
    /// The receivers must share commitment parameters and hold c1, c2, c3.
    pub fn new(
        receiver1: &Receiver<G>,
        receiver2: &Receiver<G>,
        receiver3: &Receiver<G>,
        challenge_bits: u16,
    ) -> Result<MultiplicationVerifier<G>, VerificationError> {
        Ok(MultiplicationVerifier {
            parameters: receiver1.parameters.clone(),
            c1: receiver1.commitment()?.clone(),
            c2: receiver2.commitment()?.clone(),
            c3: receiver3.commitment()?.clone(),
            challenge_bits,
            proof_random_data: None,
            challenge: None,
            state: ProtocolState::Init,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn set_proof_random_data(&mut self, proof_random_data: &ProofRandomData) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::Init)?;
        self.proof_random_data = Some(proof_random_data.clone());
        self.state = ProtocolState::RandomDataSent;
        Ok(())
    }

    pub fn get_challenge<R: MutRandState>(&mut self, rng: &mut R) -> Result<Integer, VerificationError> {
        let challenge = random_below(rng, &challenge_bound(self.challenge_bits));
        self.set_challenge(&challenge)?;
        Ok(challenge)
    }

    /// Accepts an externally derived challenge, e.g. a transcript hash.
    pub fn set_challenge(&mut self, challenge: &Integer) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::RandomDataSent)?;
        check_challenge(challenge, &challenge_bound(self.challenge_bits))?;
        self.challenge = Some(challenge.clone());
        self.state = ProtocolState::ChallengeSet;
        Ok(())
    }

    /// Checks G^u1 H^v1 = d1 c1^e, G^u H^v2 = d2 c2^e and c1^u H^v3 = d3 c3^e.
    pub fn verify(&mut self, proof_data: &ProofData) -> Result<bool, VerificationError> {
        expect_verifier_state(self.state, ProtocolState::ChallengeSet)?;
        let (random_data, challenge) = match (&self.proof_random_data, &self.challenge) {
            (Some(random_data), Some(challenge)) => (random_data, challenge),
            _ => return Err(VerificationError::UnexpectedState(self.state)),
        };
        let group = &self.parameters.group;

        let left1 = self.parameters.commit(&proof_data.u1, &proof_data.v1)?;
        let right1 = group.op(&random_data.d1, &group.exp(&self.c1, challenge)?);

        let left2 = self.parameters.commit(&proof_data.u, &proof_data.v2)?;
        let right2 = group.op(&random_data.d2, &group.exp(&self.c2, challenge)?);

        // v3 is negative whenever r3 - x2*r1 outweighs the masking; exp
        // inverts H^|v3| in that case.
        let integer_commitment_3 = IntegerCommitment::<G>::new(
            group,
            &self.c1,
            &self.parameters.h,
            &self.parameters.t,
            self.parameters.k,
        );
        let left3 = integer_commitment_3.commit(&proof_data.u, &proof_data.v3)?;
        let right3 = group.op(&random_data.d3, &group.exp(&self.c3, challenge)?);

        let accepted = left1 == right1 && left2 == right2 && left3 == right3;
        self.state = outcome(accepted);
        debug!(accepted, "multiplication proof verified");
        Ok(accepted)
    }

    pub fn verify_proof(&mut self, proof: &Proof) -> Result<bool, VerificationError> {
        self.set_proof_random_data(&proof.proof_random_data)?;
        self.set_challenge(&proof.challenge)?;
        self.verify(&proof.proof_data)
    }
}
