//! Foundation types for svcs.
//!
//! This crate provides the identifier types shared by every other svcs crate.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (raw digest bytes)
//! - [`HashAlgorithm`]: Which hash function produced an [`ObjectId`]

pub mod algorithm;
pub mod error;
pub mod object;

pub use algorithm::HashAlgorithm;
pub use error::TypeError;
pub use object::{ObjectId, MAX_DIGEST_LEN};
