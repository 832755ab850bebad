use std::collections::HashMap;
use std::sync::RwLock;

use svcs_crypto::ContentHasher;
use svcs_types::{HashAlgorithm, ObjectId};

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryObjectStore {
    hasher: ContentHasher,
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty SHA-1 store.
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create a new empty store keyed by `algorithm`.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            hasher: ContentHasher::new(algorithm),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn algorithm(&self) -> HashAlgorithm {
        self.hasher.algorithm()
    }

    fn hash(&self, data: &[u8]) -> ObjectId {
        self.hasher.hash(data)
    }

    fn write(&self, data: &[u8]) -> StoreResult<ObjectId> {
        let id = self.hasher.hash(data);
        let mut map = self.objects.write().expect("lock poisoned");
        // Write-once: an existing entry already holds identical content.
        map.entry(id).or_insert_with(|| data.to_vec());
        Ok(id)
    }

    fn read(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id)
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound(id.to_hex()))
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("algorithm", &self.algorithm())
            .field("object_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read() {
        let store = InMemoryObjectStore::new();
        let id = store.write(b"hello world").unwrap();
        assert_eq!(id.to_hex(), "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert_eq!(store.read(&id).unwrap(), b"hello world");
    }

    #[test]
    fn same_content_produces_same_id() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(b"identical content").unwrap();
        let id2 = store.write(b"identical content").unwrap();
        assert_eq!(id1, id2);
        // Only one object stored (dedup)
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_produces_different_ids() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(b"aaa").unwrap();
        let id2 = store.write(b"bbb").unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn empty_object() {
        let store = InMemoryObjectStore::new();
        let id = store.write(b"").unwrap();
        assert_eq!(id, store.hash(b""));
        assert!(store.read(&id).unwrap().is_empty());
    }

    #[test]
    fn read_missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = store.hash(b"missing");
        assert!(store.read(&id).unwrap_err().is_not_found());
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn read_verified_passes_for_stored_content() {
        let store = InMemoryObjectStore::with_algorithm(HashAlgorithm::Sha256);
        let id = store.write(b"verify me").unwrap();
        assert_eq!(store.read_verified(&id).unwrap(), b"verify me");
    }

    #[test]
    fn read_verified_detects_corruption() {
        let store = InMemoryObjectStore::new();
        let id = store.write(b"original").unwrap();
        store
            .objects
            .write()
            .unwrap()
            .insert(id, b"corrupted".to_vec());

        assert!(matches!(
            store.read_verified(&id),
            Err(StoreError::Integrity { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Batch operations
    // -----------------------------------------------------------------------

    #[test]
    fn write_batch_and_read_batch() {
        let store = InMemoryObjectStore::new();
        let objects: Vec<&[u8]> = vec![b"batch-1", b"batch-2", b"batch-3"];
        let ids = store.write_batch(&objects).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(store.len(), 3);

        let read_back = store.read_batch(&ids).unwrap();
        for (data, expected) in read_back.iter().zip(&objects) {
            assert_eq!(data.as_slice(), *expected);
        }
    }

    #[test]
    fn read_batch_fails_on_missing() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(b"exists").unwrap();
        let id2 = store.hash(b"missing");
        assert!(store.read_batch(&[id1, id2]).unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_and_is_empty() {
        let store = InMemoryObjectStore::default();
        assert!(store.is_empty());
        store.write(b"a").unwrap();
        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn total_bytes() {
        let store = InMemoryObjectStore::new();
        store.write(b"12345").unwrap(); // 5 bytes
        store.write(b"123456789").unwrap(); // 9 bytes
        assert_eq!(store.total_bytes(), 14);
    }

    #[test]
    fn all_ids_is_sorted() {
        let store = InMemoryObjectStore::new();
        for data in [&b"aaa"[..], b"bbb", b"ccc"] {
            store.write(data).unwrap();
        }
        let ids = store.all_ids();
        assert_eq!(ids.len(), 3);
        for w in ids.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn concurrent_identical_writes() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.write(b"shared data").unwrap())
            })
            .collect();

        let ids: Vec<ObjectId> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.write(b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("object_count: 1"));
    }
}
