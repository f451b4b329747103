//! Proof that a commitment c = G^x H^r hides a non-negative x.
//!
//! The prover decomposes x = r0^2 + r1^2 + r2^2 + r3^2, splits r into four
//! shares and commits to each square, c_i = G^(r_i^2) H^(rho_i). The
//! verifier checks that the c_i multiply to c and then runs four square
//! proofs in parallel, one challenge each.
use crate::{
    commitments::integer::{Committer, Receiver},
    group::{rsa::RsaSpecialGroup, HiddenOrderGroup},
    protocols::{
        challenge_bound, check_challenge, expect_prover_state, expect_verifier_state, outcome,
        square::{
            DfSquareProof, SquareProof, SquareProofData, SquareProver, SquareRandomData, SquareVerifier,
        },
        ProofError, ProtocolState, VerificationError,
    },
};
use rug::rand::MutRandState;
use rug::Integer;
use std::marker::PhantomData;
use tracing::debug;

pub mod decomposition;

pub use decomposition::{lipmaa_decomposition, split_randomness, DecompositionError, DECOMPOSITION_WIDTH};

/// Group elements in one square proof's random data.
pub const RANDOM_DATA_WIDTH: usize = SquareRandomData::WIDTH;
/// Integers in one square proof's responses.
pub const PROOF_DATA_WIDTH: usize = SquareProofData::WIDTH;

/// What the verifier needs before the first move: commitments to the four
/// roots and to their squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierInitializationData {
    pub small_commitments: Vec<Integer>,
    pub big_commitments: Vec<Integer>,
}

impl VerifierInitializationData {
    /// With the factorization at hand every commitment can be checked to lie
    /// in QR_N.
    pub fn check_quadratic_residues(&self, group: &RsaSpecialGroup) -> Result<(), VerificationError> {
        let all_residues = self
            .small_commitments
            .iter()
            .chain(self.big_commitments.iter())
            .all(|c| group.is_quadratic_residue(c));
        if all_residues {
            Ok(())
        } else {
            Err(VerificationError::NotQuadraticResidue)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub proof_random_data: Vec<SquareRandomData>,
    pub challenges: Vec<Integer>,
    pub proof_data: Vec<SquareProofData>,
}

pub fn flatten_random_data(random_data: &[SquareRandomData]) -> Vec<Integer> {
    random_data.iter().flat_map(|d| d.to_vec()).collect()
}

pub fn flatten_proof_data(proof_data: &[SquareProofData]) -> Vec<Integer> {
    proof_data.iter().flat_map(|d| d.to_vec()).collect()
}

pub struct PositiveProver<G: HiddenOrderGroup, S: SquareProof<G> = DfSquareProof> {
    square_provers: Vec<S::Prover>,
    initialization_data: VerifierInitializationData,
    state: ProtocolState,
    _group: PhantomData<G>,
}

impl<G: HiddenOrderGroup> PositiveProver<G> {
    /// `committer` must hold the opening (x, r) of the commitment.
    pub fn new<R: MutRandState>(
        committer: &Committer<G>,
        challenge_bits: u16,
        rng: &mut R,
    ) -> Result<PositiveProver<G>, ProofError> {
        Self::with_square_proof(committer, challenge_bits, rng)
    }
}

impl<G: HiddenOrderGroup, S: SquareProof<G>> PositiveProver<G, S> {
    pub fn with_square_proof<R: MutRandState>(
        committer: &Committer<G>,
        challenge_bits: u16,
        rng: &mut R,
    ) -> Result<PositiveProver<G, S>, ProofError> {
        let (x, r) = committer.get_decommit_msg()?;
        let roots = lipmaa_decomposition(x, rng)?;
        let shares = split_randomness(r, DECOMPOSITION_WIDTH, rng);

        let mut square_provers = Vec::with_capacity(DECOMPOSITION_WIDTH);
        let mut small_commitments = Vec::with_capacity(DECOMPOSITION_WIDTH);
        let mut big_commitments = Vec::with_capacity(DECOMPOSITION_WIDTH);
        for (root, share) in roots.iter().zip(shares.iter()) {
            let mut square_committer = Committer::new(&committer.parameters);
            let big_commitment =
                square_committer.get_commit_msg_with_given_r(&Integer::from(root.square_ref()), share)?;
            let prover = S::prover(&square_committer, root, challenge_bits, rng)?;
            small_commitments.push(prover.small_commitment().clone());
            big_commitments.push(big_commitment);
            square_provers.push(prover);
        }
        debug!(squares = DECOMPOSITION_WIDTH, "positive proof prepared");

        Ok(PositiveProver {
            square_provers,
            initialization_data: VerifierInitializationData {
                small_commitments,
                big_commitments,
            },
            state: ProtocolState::Init,
            _group: PhantomData,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn get_verifier_initialization_data(&self) -> &VerifierInitializationData {
        &self.initialization_data
    }

    pub fn get_proof_random_data<R: MutRandState>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<SquareRandomData>, ProofError> {
        expect_prover_state(self.state, ProtocolState::Init)?;
        let random_data = self
            .square_provers
            .iter_mut()
            .map(|prover| prover.get_proof_random_data(rng))
            .collect::<Result<Vec<_>, _>>()?;
        self.state = ProtocolState::RandomDataSent;
        Ok(random_data)
    }

    /// Takes one challenge per square proof.
    pub fn get_proof_data(&mut self, challenges: &[Integer]) -> Result<Vec<SquareProofData>, ProofError> {
        expect_prover_state(self.state, ProtocolState::RandomDataSent)?;
        if challenges.len() != DECOMPOSITION_WIDTH {
            return Err(ProofError::LengthMismatch(DECOMPOSITION_WIDTH, challenges.len()));
        }
        let proof_data = self
            .square_provers
            .iter_mut()
            .zip(challenges.iter())
            .map(|(prover, challenge)| prover.get_proof_data(challenge))
            .collect::<Result<Vec<_>, _>>()?;
        self.state = ProtocolState::ResponseSent;
        Ok(proof_data)
    }
}

pub struct PositiveVerifier<G: HiddenOrderGroup, S: SquareProof<G> = DfSquareProof> {
    square_verifiers: Vec<S::Verifier>,
    challenge_bits: u16,
    state: ProtocolState,
    _group: PhantomData<G>,
}

impl<G: HiddenOrderGroup> PositiveVerifier<G> {
    /// Works with the modulus alone; sub-commitments are not checked for
    /// membership in QR_N.
    pub fn new(
        receiver: &Receiver<G>,
        initialization_data: &VerifierInitializationData,
        challenge_bits: u16,
    ) -> Result<PositiveVerifier<G>, VerificationError> {
        Self::with_square_proof(receiver, initialization_data, challenge_bits)
    }
}

impl PositiveVerifier<RsaSpecialGroup> {
    /// For a verifier that generated the modulus: additionally rejects
    /// sub-commitments outside QR_N.
    pub fn new_with_factorization(
        receiver: &Receiver<RsaSpecialGroup>,
        initialization_data: &VerifierInitializationData,
        challenge_bits: u16,
    ) -> Result<PositiveVerifier<RsaSpecialGroup>, VerificationError> {
        initialization_data.check_quadratic_residues(&receiver.parameters.group)?;
        Self::with_square_proof(receiver, initialization_data, challenge_bits)
    }
}

impl<G: HiddenOrderGroup, S: SquareProof<G>> PositiveVerifier<G, S> {
    pub fn with_square_proof(
        receiver: &Receiver<G>,
        initialization_data: &VerifierInitializationData,
        challenge_bits: u16,
    ) -> Result<PositiveVerifier<G, S>, VerificationError> {
        let VerifierInitializationData {
            small_commitments,
            big_commitments,
        } = initialization_data;
        for commitments in &[small_commitments, big_commitments] {
            if commitments.len() != DECOMPOSITION_WIDTH {
                return Err(VerificationError::LengthMismatch(DECOMPOSITION_WIDTH, commitments.len()));
            }
        }

        let group = &receiver.parameters.group;
        let product = big_commitments
            .iter()
            .fold(group.identity(), |acc, c| group.op(&acc, c));
        if product != group.elem(receiver.commitment()?) {
            return Err(VerificationError::CommitmentsMismatch);
        }

        let square_verifiers = small_commitments
            .iter()
            .zip(big_commitments.iter())
            .map(|(small, big)| {
                S::verifier(&Receiver::with_commitment(&receiver.parameters, big), small, challenge_bits)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PositiveVerifier {
            square_verifiers,
            challenge_bits,
            state: ProtocolState::Init,
            _group: PhantomData,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn set_proof_random_data(&mut self, proof_random_data: &[SquareRandomData]) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::Init)?;
        if proof_random_data.len() != DECOMPOSITION_WIDTH {
            return Err(VerificationError::LengthMismatch(
                DECOMPOSITION_WIDTH,
                proof_random_data.len(),
            ));
        }
        for (verifier, random_data) in self.square_verifiers.iter_mut().zip(proof_random_data) {
            verifier.set_proof_random_data(random_data)?;
        }
        self.state = ProtocolState::RandomDataSent;
        Ok(())
    }

    /// Same as [`Self::set_proof_random_data`], from the concatenated
    /// d1, d2 pairs.
    pub fn set_proof_random_data_flat(&mut self, elements: &[Integer]) -> Result<(), VerificationError> {
        let expected = DECOMPOSITION_WIDTH * RANDOM_DATA_WIDTH;
        if elements.len() != expected {
            return Err(VerificationError::LengthMismatch(expected, elements.len()));
        }
        let random_data = elements
            .chunks(RANDOM_DATA_WIDTH)
            .filter_map(SquareRandomData::from_slice)
            .collect::<Vec<_>>();
        self.set_proof_random_data(&random_data)
    }

    pub fn get_challenges<R: MutRandState>(&mut self, rng: &mut R) -> Result<Vec<Integer>, VerificationError> {
        expect_verifier_state(self.state, ProtocolState::RandomDataSent)?;
        let challenges = self
            .square_verifiers
            .iter_mut()
            .map(|verifier| verifier.get_challenge(rng))
            .collect::<Result<Vec<_>, _>>()?;
        self.state = ProtocolState::ChallengeSet;
        Ok(challenges)
    }

    /// Accepts externally derived challenges, one per square proof.
    pub fn set_challenges(&mut self, challenges: &[Integer]) -> Result<(), VerificationError> {
        expect_verifier_state(self.state, ProtocolState::RandomDataSent)?;
        if challenges.len() != DECOMPOSITION_WIDTH {
            return Err(VerificationError::LengthMismatch(DECOMPOSITION_WIDTH, challenges.len()));
        }
        let bound = challenge_bound(self.challenge_bits);
        for challenge in challenges {
            check_challenge(challenge, &bound)?;
        }
        for (verifier, challenge) in self.square_verifiers.iter_mut().zip(challenges) {
            verifier.set_challenge(challenge)?;
        }
        self.state = ProtocolState::ChallengeSet;
        Ok(())
    }

    /// Accepts only if all four square proofs do. Every sub-proof is checked
    /// even after a failure; a wrong number of responses rejects.
    pub fn verify(&mut self, proof_data: &[SquareProofData]) -> Result<bool, VerificationError> {
        expect_verifier_state(self.state, ProtocolState::ChallengeSet)?;
        let mut accepted = proof_data.len() == DECOMPOSITION_WIDTH;
        if accepted {
            for (verifier, data) in self.square_verifiers.iter_mut().zip(proof_data) {
                match verifier.verify(data) {
                    Ok(ok) => accepted &= ok,
                    Err(err) => {
                        self.state = ProtocolState::Rejected;
                        return Err(err);
                    }
                }
            }
        }
        self.state = outcome(accepted);
        debug!(accepted, "positive proof verified");
        Ok(accepted)
    }

    /// Same as [`Self::verify`], from the concatenated s1, s21, s22 triples.
    pub fn verify_flat(&mut self, elements: &[Integer]) -> Result<bool, VerificationError> {
        let proof_data = if elements.len() == DECOMPOSITION_WIDTH * PROOF_DATA_WIDTH {
            elements
                .chunks(PROOF_DATA_WIDTH)
                .filter_map(SquareProofData::from_slice)
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        };
        self.verify(&proof_data)
    }

    pub fn verify_proof(&mut self, proof: &Proof) -> Result<bool, VerificationError> {
        self.set_proof_random_data(&proof.proof_random_data)?;
        self.set_challenges(&proof.challenges)?;
        self.verify(&proof.proof_data)
    }
}
