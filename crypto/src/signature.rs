use core::fmt;

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use parity_scale_codec::{Decode, Encode};
use rand::rngs::OsRng;

use crate::{Error, Hash, ParseError};

/// Ed25519 public key. Doubles as the raw form of an account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wrap raw key bytes, checking that they form a valid curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, ParseError> {
        VerifyingKey::from_bytes(&bytes)
            .map(|_| Self(bytes))
            .map_err(|err| ParseError(err.to_string()))
    }

    /// Raw key bytes.
    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Verify `signature` over `message`.
    ///
    /// # Errors
    /// Fails if the key is malformed or the signature does not match.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Error> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|err| ParseError(err.to_string()))?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        key.verify(message, &signature)
            .map_err(|_| Error::BadSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(0x{})", hex::encode(self.0))
    }
}

/// Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Raw signature bytes.
    pub const fn to_bytes(self) -> [u8; 64] {
        self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(self.0))
    }
}

/// Pair of Public and Private keys.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a random key pair using the OS entropy source.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministically derive a key pair from a seed phrase such as `//Alice`.
    ///
    /// The secret is the blake2b-256 digest of the seed. This is a development
    /// convenience and not a hierarchical key derivation.
    pub fn from_seed(seed: impl AsRef<[u8]>) -> Self {
        let secret: [u8; 32] = Hash::new(seed).into();
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    /// Public key of the pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
