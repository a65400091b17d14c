//! Content hashing
//!
//! Every importable entity is identified within a run by a salted SHA-256
//! digest of its identity-defining fields.

use sha2::{Digest, Sha256};

/// Salted SHA-256 hasher producing lowercase hex digests
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    salt: String,
}

impl ContentHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hash `input` followed by the salt
    pub fn hash(&self, input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hasher.update(self.salt.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
