use std::io::{self, Read};

use sha1::Digest;
use svcs_types::{HashAlgorithm, ObjectId};

const READ_CHUNK: usize = 64 * 1024;

/// Content hasher for a single [`HashAlgorithm`].
///
/// Hashing is plain: the digest covers exactly the object's bytes with no
/// header or domain tag, so a SHA-1 id equals `sha1sum` of the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
}

impl ContentHasher {
    /// SHA-1 hasher.
    pub const SHA1: Self = Self::new(HashAlgorithm::Sha1);
    /// SHA-256 hasher.
    pub const SHA256: Self = Self::new(HashAlgorithm::Sha256);
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self::new(HashAlgorithm::Blake3);

    /// Create a hasher for the given algorithm.
    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash raw bytes.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut state = State::new(self.algorithm);
        state.update(data);
        state.finish()
    }

    /// Hash everything `reader` yields, without buffering it whole.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<ObjectId> {
        let mut state = State::new(self.algorithm);
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => state.update(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(state.finish())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The algorithm used by this hasher.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

/// In-progress digest state.
enum State {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl State {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Self::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finish(self) -> ObjectId {
        match self {
            Self::Sha1(h) => {
                let mut out = [0u8; 20];
                out.copy_from_slice(&h.finalize());
                ObjectId::from_sha1(out)
            }
            Self::Sha256(h) => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&h.finalize());
                ObjectId::from_hash(out)
            }
            Self::Blake3(h) => ObjectId::from_hash(*h.finalize().as_bytes()),
        }
    }
}
