//! Content hashing for svcs.
//!
//! Wraps established hash implementations (RustCrypto `sha1`/`sha2`, and
//! `blake3`) behind one [`ContentHasher`] that turns bytes into an
//! [`ObjectId`](svcs_types::ObjectId). No custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
