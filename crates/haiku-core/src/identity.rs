//! Identifier generation.
//!
//! # Identifier Format
//!
//! An identifier is generated as follows:
//! 1. Read 64 bytes from the operating system's CSPRNG
//! 2. Encode them as lowercase hex
//!
//! The result is always [`ID_LEN`] (128) bytes of ASCII text, so it can be
//! used verbatim in URL paths, JSON bodies and `TEXT` columns.
//!
//! # Example
//!
//! ```
//! use haiku_core::identity::generate_id;
//! use haiku_core::types::ID_LEN;
//!
//! let id = generate_id().unwrap();
//! assert_eq!(id.len(), ID_LEN);
//! assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
//! ```

use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::types::ID_LEN;

/// Number of random bytes behind each identifier.
pub const ID_ENTROPY_BYTES: usize = ID_LEN / 2;

/// Errors produced while generating or parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The OS entropy source failed.
    #[error("entropy source failure: {0}")]
    Entropy(String),

    /// The identifier is empty.
    #[error("identifier must not be empty")]
    Empty,

    /// The identifier does not have the fixed length.
    #[error("identifier must be exactly 128 bytes, got {0}")]
    InvalidLength(usize),

    /// The identifier contains a character outside `[0-9a-fA-F]`.
    #[error("identifier must only contain hex digits")]
    InvalidCharacter,
}

/// Generate a new random identifier.
///
/// Uniqueness is not checked here; the store's primary keys reject a
/// collision at insert time.
pub fn generate_id() -> Result<String, IdError> {
    random_token(ID_ENTROPY_BYTES)
}

/// Hex-encode `len` fresh random bytes.
///
/// Shorter tokens (request ids, for instance) use this directly.
pub fn random_token(len: usize) -> Result<String, IdError> {
    let mut raw = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|e| IdError::Entropy(e.to_string()))?;
    Ok(hex::encode(raw))
}
