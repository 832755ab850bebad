use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Hash function used to derive object identifiers.
///
/// A store records its algorithm once and never mixes them, so an
/// [`ObjectId`](crate::ObjectId) is only meaningful together with the
/// algorithm of the store that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, 20-byte digests. Not collision-resistant against adversarial
    /// input; kept as the default for compatibility with existing stores.
    #[default]
    Sha1,
    /// SHA-256, 32-byte digests.
    Sha256,
    /// BLAKE3, 32-byte digests.
    Blake3,
}

impl HashAlgorithm {
    /// All supported algorithms.
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha1, Self::Sha256, Self::Blake3];

    /// Digest length in bytes.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 | Self::Blake3 => 32,
        }
    }

    /// Digest length in lowercase hex characters.
    pub const fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }

    /// Canonical lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(TypeError::UnknownAlgorithm(s.to_string())),
        }
    }
}
