//! Cryptographic primitives used by the healthchain client: blake2b hashes
//! and ed25519 key pairs.

mod hash;
mod signature;

pub use hash::{blake2b_512, Hash, HashOf};
pub use signature::{KeyPair, PublicKey, Signature};

/// Error indicating a malformed textual or binary representation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Errors of the cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum Error {
    /// Failed to parse: {0}
    Parse(#[from] ParseError),
    /// Signature verification failed
    BadSignature,
}

pub mod prelude {
    //! Re-exports of the most used items.

    pub use super::{Hash, HashOf, KeyPair, PublicKey, Signature};
}
