use crate::*;
use digest::Digest;
use rand::RngCore;
use sha3::Keccak256;
use std::fmt;
use std::str::FromStr;

/// Random blinding value chosen by the voter at commit time
#[derive(Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Salt(pub Hash32);

impl Salt {
    /// Draw a fresh salt from the operating system's CSPRNG
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Salt(Hash32(bytes))
    }
}

impl FromStr for Salt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Salt(s.parse()?))
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Salt({})", self.0)
    }
}

/// A hiding, binding commitment to a (candidate, salt) pair
#[derive(Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Commitment(pub Hash32);

impl Commitment {
    /// The "no commitment" sentinel
    pub const ZERO: Commitment = Commitment(Hash32::ZERO);

    /// Commit to a candidate
    pub fn new(candidate_id: CandidateId, salt: &Salt) -> Self {
        commitment_hash(candidate_id, salt)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check that this commitment opens to the given candidate and salt
    pub fn verify(&self, candidate_id: CandidateId, salt: &Salt) -> bool {
        commitment_hash(candidate_id, salt) == *self
    }
}

impl FromStr for Commitment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Commitment(s.parse()?))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Commitment({})", self.0)
    }
}

/// keccak256(uint256(candidate_id) || salt)
///
/// The candidate id is left-padded to a 32 byte big-endian word, matching the
/// ABI encoding of `(uint256, bytes32)`, so commitments built by Ethereum
/// tooling verify here unchanged.
pub fn commitment_hash(candidate_id: CandidateId, salt: &Salt) -> Commitment {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&candidate_id.to_be_bytes());

    let mut hasher = Keccak256::new();
    hasher.update(&word);
    hasher.update(salt.0.as_bytes());

    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Commitment(Hash32(out))
}
