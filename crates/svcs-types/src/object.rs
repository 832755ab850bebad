use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::algorithm::HashAlgorithm;
use crate::error::TypeError;

/// Largest digest any supported algorithm produces, in bytes.
pub const MAX_DIGEST_LEN: usize = 32;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` holds the raw digest of an object's content: 20 bytes for
/// SHA-1, 32 bytes for SHA-256 and BLAKE3. Identical content always produces
/// the same `ObjectId` under the same algorithm.
///
/// The textual form is lowercase hex and is also the object's file name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    len: u8,
    bytes: [u8; MAX_DIGEST_LEN],
}

impl ObjectId {
    /// Create an `ObjectId` from a pre-computed 32-byte hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self { len: 32, bytes: hash }
    }

    /// Create an `ObjectId` from a pre-computed 20-byte SHA-1 hash.
    pub fn from_sha1(hash: [u8; 20]) -> Self {
        let mut bytes = [0u8; MAX_DIGEST_LEN];
        bytes[..20].copy_from_slice(&hash);
        Self { len: 20, bytes }
    }

    /// Wrap a pre-computed digest.
    ///
    /// Only the digest lengths of supported algorithms (20 or 32 bytes) are
    /// accepted.
    pub fn from_digest(digest: &[u8]) -> Result<Self, TypeError> {
        if digest.len() != 20 && digest.len() != MAX_DIGEST_LEN {
            return Err(TypeError::UnsupportedDigestLength(digest.len()));
        }
        let mut bytes = [0u8; MAX_DIGEST_LEN];
        bytes[..digest.len()].copy_from_slice(digest);
        Ok(Self {
            len: digest.len() as u8,
            bytes,
        })
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Digest length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if the digest has no bytes (never the case for ids
    /// built by this crate).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hex-encoded string representation (lowercase).
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.bytes[..4])
    }

    /// Parse from a hex string of any supported digest length.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_digest(&bytes)
    }

    /// Parse from a hex string, requiring the digest length of `algorithm`.
    pub fn parse_for(algorithm: HashAlgorithm, s: &str) -> Result<Self, TypeError> {
        if s.len() != algorithm.hex_len() {
            return Err(TypeError::InvalidLength {
                expected: algorithm.hex_len(),
                actual: s.len(),
            });
        }
        Self::from_hex(s)
    }

    /// Whether this id has the digest length `algorithm` produces.
    pub fn matches(&self, algorithm: HashAlgorithm) -> bool {
        self.len() == algorithm.digest_len()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA1_EMPTY: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn sha1_length_id() {
        let id = ObjectId::from_hex(SHA1_EMPTY).unwrap();
        assert_eq!(id.len(), 20);
        assert!(id.matches(HashAlgorithm::Sha1));
        assert!(!id.matches(HashAlgorithm::Sha256));
        assert_eq!(id.to_hex(), SHA1_EMPTY);
    }

    #[test]
    fn uppercase_input_normalizes_to_lowercase() {
        let id = ObjectId::from_hex(&SHA256_EMPTY.to_uppercase()).unwrap();
        assert_eq!(id.to_string(), SHA256_EMPTY);
    }

    #[test]
    fn rejects_unsupported_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::UnsupportedDigestLength(2));
        assert!(err.to_string().contains("expected 20 or 32"));
        assert_eq!(
            ObjectId::from_digest(&[0u8; 21]),
            Err(TypeError::UnsupportedDigestLength(21))
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            ObjectId::from_hex("../store.toml"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn parse_for_enforces_algorithm_length() {
        assert!(ObjectId::parse_for(HashAlgorithm::Sha1, SHA1_EMPTY).is_ok());
        assert!(matches!(
            ObjectId::parse_for(HashAlgorithm::Sha256, SHA1_EMPTY),
            Err(TypeError::InvalidLength {
                expected: 64,
                actual: 40
            })
        ));
    }

    #[test]
    fn short_hex_is_8_chars() {
        let id = ObjectId::from_hex(SHA1_EMPTY).unwrap();
        assert_eq!(id.short_hex(), "da39a3ee");
        assert_eq!(format!("{id:?}"), "ObjectId(da39a3ee)");
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = ObjectId::from_hex(SHA1_EMPTY).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SHA1_EMPTY}\""));
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn ordering_follows_hex_order() {
        let low = ObjectId::from_hex(&"0".repeat(40)).unwrap();
        let high = ObjectId::from_hex(SHA1_EMPTY).unwrap();
        assert!(low < high);
    }
}
