use crate::*;
use hex_buffer_serde::{Hex, HexForm};
use std::convert::TryInto;
use std::fmt;
use std::str::FromStr;

/// Sequential election identifier, starting at 1
pub type ElectionId = u64;

/// Candidate identifier as chosen by the election authority
pub type CandidateId = u64;

/// Seconds on the ledger clock
pub type Timestamp = u64;

/// Decode a `0x`-prefixed (or bare) hex string into exactly `N` bytes
fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], Error> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|_| Error::BadHex)?;
    let found = bytes.len();
    bytes.try_into().map_err(|_| Error::BadLength {
        expected: N,
        found,
    })
}

/// A 20 byte account identifier
///
/// Addresses are authenticated by the ledger: an operation only ever sees the
/// address of the sender that signed the enclosing transaction.
///
/// Serialized as bare hex in human-readable formats and as raw bytes otherwise.
#[derive(Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(#[serde(with = "HexForm")] pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| Error::BadLength {
            expected: 20,
            found: bytes.len(),
        })?;
        Ok(Address(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(decode_fixed(s)?))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// A 32 byte value: commitments, salts, transaction and block hashes
#[derive(Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash32(#[serde(with = "HexForm")] pub [u8; 32]);

impl Hash32 {
    pub const ZERO: Hash32 = Hash32([0; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Hash32(bytes)
    }
}

impl FromStr for Hash32 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Hash32(decode_fixed(s)?))
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Hash32({})", self)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn address_text_form() {
        let addr = Address::from_str("0x00000000000000000000000000000000000000Ab").unwrap();
        assert_eq!(addr.0[19], 0xab);
        assert_eq!(
            addr.to_string(),
            "0x00000000000000000000000000000000000000ab"
        );

        // Bare hex is accepted too
        let bare = Address::from_str("00000000000000000000000000000000000000ab").unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn bad_text_forms() {
        assert!(matches!(Address::from_str("0xzz"), Err(Error::BadHex)));
        assert!(matches!(
            Address::from_str("0xabcd"),
            Err(Error::BadLength {
                expected: 20,
                found: 2
            })
        ));
        assert!(matches!(
            Hash32::from_str(&format!("0x{}", "11".repeat(20))),
            Err(Error::BadLength {
                expected: 32,
                found: 20
            })
        ));
    }

    #[test]
    fn hash_zero_sentinel() {
        assert!(Hash32::ZERO.is_zero());
        assert!(!Hash32([1; 32]).is_zero());

        let json = serde_json::to_string(&Hash32::ZERO).unwrap();
        assert_eq!(json, format!("\"{}\"", "00".repeat(32)));
    }

    #[test]
    fn hex_in_json_bytes_in_cbor() {
        let addr = Address([0xab; 20]);

        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(20)));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), addr);

        // One header byte plus the raw 20 bytes, not 40 hex digits
        let cbor = serde_cbor::to_vec(&addr).unwrap();
        assert_eq!(cbor.len(), 21);
        assert_eq!(&cbor[1..], &addr.0[..]);
        assert_eq!(serde_cbor::from_slice::<Address>(&cbor).unwrap(), addr);

        let hash = Hash32([0x11; 32]);
        let cbor = serde_cbor::to_vec(&hash).unwrap();
        assert_eq!(cbor.len(), 34);
        assert_eq!(serde_cbor::from_slice::<Hash32>(&cbor).unwrap(), hash);

        assert!(serde_json::from_str::<Address>("\"abcd\"").is_err());
    }
}
