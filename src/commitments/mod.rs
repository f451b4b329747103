//! Implements integer commitments over hidden-order groups.

use rug::Integer;

pub mod integer;

quick_error! {
    #[derive(Debug)]
    pub enum CommitmentError {
        WrongOpening {}
        IntegerTooBig {}
        NotCommitted {}
        IntegerError(err: Integer) {
            from()
        }
    }
}

pub trait Commitment {
    type Instance;

    fn commit(
        &self,
        value: &Integer,
        randomness: &Integer,
    ) -> Result<Self::Instance, CommitmentError>;
    fn open(
        &self,
        commitment: &Self::Instance,
        value: &Integer,
        randomness: &Integer,
    ) -> Result<(), CommitmentError>;
}
