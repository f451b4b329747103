//! Sigma protocols over hidden-order groups for statements about integers
//! hidden in Damgård–Fujisaki commitments: knowledge of a representation,
//! multiplication of committed values and non-negativity of a committed value.
#[macro_use]
extern crate quick_error;

pub mod utils;
pub mod parameters;
pub mod group;
pub mod commitments;
pub mod protocols;
