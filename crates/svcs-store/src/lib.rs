//! Content-addressed object storage for svcs.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Every object is an immutable byte payload
//! stored under the lowercase hex digest of its own content.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FsObjectStore`] -- one file per object under `<root>/objects/`
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes stage to a temporary file and rename into place, so a reader
//!    sees either nothing or the complete object.
//! 3. Concurrent writes of the same content are idempotent; writes of
//!    different content never coordinate.
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. Each store uses one hash algorithm, recorded in `<root>/store.toml`.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{Layout, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use fs::{FsObjectStore, FsckReport};
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;

pub use svcs_types::{HashAlgorithm, ObjectId};
