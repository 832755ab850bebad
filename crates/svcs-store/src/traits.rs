use svcs_crypto::ContentHasher;
use svcs_types::{HashAlgorithm, ObjectId};

use crate::error::{StoreError, StoreResult};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same bytes always produce the
///   same ID, so a second write of identical content is a no-op.
/// - Per digest there are two states, absent and present, and the only
///   transition is absent → present via [`write`](Self::write).
/// - A reader never observes a partially written object.
/// - The store never interprets object contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// The hash function this store keys objects by.
    fn algorithm(&self) -> HashAlgorithm;

    /// Compute the ID `data` would be stored under. Pure; touches no storage.
    fn hash(&self, data: &[u8]) -> ObjectId {
        ContentHasher::new(self.algorithm()).hash(data)
    }

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists this is a no-op and still returns the ID.
    fn write(&self, data: &[u8]) -> StoreResult<ObjectId>;

    /// Read an object by its content-addressed ID.
    ///
    /// Returns [`StoreError::ObjectNotFound`] if the object does not exist.
    /// Content is returned as stored, without re-hashing.
    fn read(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read an object and check that its content still hashes to `id`.
    fn read_verified(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let data = self.read(id)?;
        let computed = self.hash(&data);
        if computed != *id {
            return Err(StoreError::Integrity {
                id: *id,
                computed,
            });
        }
        Ok(data)
    }

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `read()` for each ID and stops at the
    /// first error.
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Vec<u8>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their IDs.
    ///
    /// Default implementation calls `write()` for each object.
    fn write_batch(&self, objects: &[&[u8]]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|data| self.write(data)).collect()
    }
}
