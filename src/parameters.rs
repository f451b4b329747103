//! Derives protocol parameters given a desired security level.

use std::fmt;

#[derive(Clone, Debug)]
pub struct Parameters {
    /// Statistical slack, in bits, added to the commitment randomness and to
    /// every masking range.
    pub security_level: u16, // K
    /// Size of the challenge space: challenges are taken from [0, 2^challenge_bits).
    pub challenge_bits: u16,
    /// Bit length of the hidden-order modulus N.
    pub modulus_bits: u16,
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Parameters(K={} (security level), challenge space={} bits, N={} bits)",
            self.security_level, self.challenge_bits, self.modulus_bits,
        )
    }
}

quick_error! {
    #[derive(Debug)]
    pub enum ParametersError {
        InvalidParameters {}
    }
}

impl Parameters {
    /// Derive parameters for a desired security level, choosing the modulus
    /// size from the usual factoring-hardness estimates.
    pub fn from_security_level(security_level: u16) -> Result<Parameters, ParametersError> {
        let modulus_bits = match security_level {
            0 => return Err(ParametersError::InvalidParameters),
            1..=80 => 1024,
            81..=112 => 2048,
            113..=128 => 3072,
            _ => return Err(ParametersError::InvalidParameters),
        };
        let parameters = Parameters {
            security_level,
            challenge_bits: security_level,
            modulus_bits,
        };

        parameters.is_valid()?;
        Ok(parameters)
    }

    /// Parameters for an existing modulus size, e.g. a test group.
    pub fn with_modulus_bits(
        security_level: u16,
        challenge_bits: u16,
        modulus_bits: u16,
    ) -> Result<Parameters, ParametersError> {
        let parameters = Parameters {
            security_level,
            challenge_bits,
            modulus_bits,
        };

        parameters.is_valid()?;
        Ok(parameters)
    }

    /// Soundness needs every challenge to stay below the smallest prime
    /// factor of N.
    pub fn is_valid(&self) -> Result<(), ParametersError> {
        if self.security_level > 0
            && self.challenge_bits > 0
            && self.challenge_bits < self.modulus_bits / 2
        {
            Ok(())
        } else {
            Err(ParametersError::InvalidParameters)
        }
    }
}
