//! Three-move sigma protocols: the prover sends random data, the verifier
//! answers with a challenge, the prover responds with proof data.
use crate::{commitments::CommitmentError, utils::pow2};
use positive::decomposition::DecompositionError;
use rug::Integer;

pub mod representation;
pub mod multiplication;
pub mod square;
pub mod positive;

/// Progress of one protocol session. Provers move through `Init`,
/// `RandomDataSent` and `ResponseSent`; verifiers through `Init`,
/// `RandomDataSent`, `ChallengeSet` and finally `Verified` or `Rejected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolState {
    Init,
    RandomDataSent,
    ChallengeSet,
    ResponseSent,
    Verified,
    Rejected,
}

quick_error! {
    #[derive(Debug)]
    pub enum ProofError {
        UnexpectedState(state: ProtocolState) {
            display("operation not allowed in prover state {:?}", state)
        }
        SecretsBasesMismatch(secrets: usize, bases: usize) {
            display("{} secrets given for {} bases", secrets, bases)
        }
        LengthMismatch(expected: usize, got: usize) {
            display("expected {} elements, got {}", expected, got)
        }
        Decomposition(err: DecompositionError) {
            from()
        }
        CommitmentError(err: CommitmentError) {
            from()
        }
        IntegerError(err: Integer) {
            from()
        }
    }
}

quick_error! {
    #[derive(Debug)]
    pub enum VerificationError {
        UnexpectedState(state: ProtocolState) {
            display("operation not allowed in verifier state {:?}", state)
        }
        LengthMismatch(expected: usize, got: usize) {
            display("expected {} elements, got {}", expected, got)
        }
        ChallengeOutOfRange {}
        CommitmentsMismatch {}
        NotQuadraticResidue {}
        CommitmentError(err: CommitmentError) {
            from()
        }
        IntegerError(err: Integer) {
            from()
        }
    }
}

/// Exclusive upper bound of a challenge space of `challenge_bits` bits.
pub fn challenge_bound(challenge_bits: u16) -> Integer {
    pow2(challenge_bits as u32)
}

pub(crate) fn check_challenge(challenge: &Integer, bound: &Integer) -> Result<(), VerificationError> {
    if *challenge < 0 || challenge >= bound {
        Err(VerificationError::ChallengeOutOfRange)
    } else {
        Ok(())
    }
}

/// Fails unless the session is in `expected`.
pub(crate) fn expect_prover_state(state: ProtocolState, expected: ProtocolState) -> Result<(), ProofError> {
    if state == expected {
        Ok(())
    } else {
        Err(ProofError::UnexpectedState(state))
    }
}

pub(crate) fn expect_verifier_state(
    state: ProtocolState,
    expected: ProtocolState,
) -> Result<(), VerificationError> {
    if state == expected {
        Ok(())
    } else {
        Err(VerificationError::UnexpectedState(state))
    }
}

pub(crate) fn outcome(accepted: bool) -> ProtocolState {
    if accepted {
        ProtocolState::Verified
    } else {
        ProtocolState::Rejected
    }
}
