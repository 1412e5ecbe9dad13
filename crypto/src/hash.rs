use core::{fmt, hash, marker::PhantomData, str::FromStr};

use blake2::{
    digest::{consts::U32, Digest},
    Blake2b, Blake2b512,
};
use derive_more::Deref;
use parity_scale_codec::{Decode, Encode, Input, Output};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseError;

type Blake2b256 = Blake2b<U32>;

/// Hash of healthchain entities. Currently supports only blake2b-256.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Decode, Encode)]
pub struct Hash([u8; Self::LENGTH]);

impl Hash {
    /// Length of hash
    pub const LENGTH: usize = 32;

    /// Wrap the given bytes; they must be prehashed with blake2b-256
    pub const fn prehashed(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Construct zeroed hash
    #[must_use]
    pub const fn zeroed() -> Self {
        Self::prehashed([0; Self::LENGTH])
    }

    /// Hash the given bytes.
    #[must_use]
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let digest = Blake2b256::digest(bytes.as_ref());
        let mut hash = [0; Self::LENGTH];
        hash.copy_from_slice(&digest);
        Self::prehashed(hash)
    }

    /// Adds type information to the hash. Be careful about using this function
    /// since it is not possible to validate the correctness of the conversion.
    /// Prefer creating new hashes with [`HashOf::new`] whenever possible
    #[must_use]
    pub const fn typed<T>(self) -> HashOf<T> {
        HashOf(self, PhantomData)
    }

    /// Raw bytes of the hash.
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

/// Blake2b-512 digest, used by address checksums.
pub fn blake2b_512(bytes: impl AsRef<[u8]>) -> [u8; 64] {
    let digest = Blake2b512::digest(bytes.as_ref());
    let mut out = [0; 64];
    out.copy_from_slice(&digest);
    out
}

impl From<Hash> for [u8; Hash::LENGTH] {
    #[inline]
    fn from(Hash(bytes): Hash) -> Self {
        bytes
    }
}

impl AsRef<[u8]> for Hash {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

impl FromStr for Hash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0; Self::LENGTH];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|err| ParseError(format!("invalid hash `{s}`: {err}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Represents hash of healthchain entities like a `Call` or a block.
#[derive(Deref)]
pub struct HashOf<T>(#[deref] Hash, PhantomData<T>);

impl<T> HashOf<T> {
    /// Transmutes hash to some specific type.
    /// Don't use this method if not required.
    #[inline]
    #[must_use]
    pub const fn transmute<F>(self) -> HashOf<F> {
        HashOf(self.0, PhantomData)
    }

    /// Erases the type information.
    #[inline]
    pub const fn untyped(self) -> Hash {
        self.0
    }
}

impl<T: Encode> HashOf<T> {
    /// Construct typed hash of the SCALE encoding of `value`.
    #[must_use]
    pub fn new(value: &T) -> Self {
        Self(Hash::new(value.encode()), PhantomData)
    }
}

impl<T> Clone for HashOf<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HashOf<T> {}

impl<T> PartialEq for HashOf<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T> Eq for HashOf<T> {}

impl<T> hash::Hash for HashOf<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> fmt::Display for HashOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> fmt::Debug for HashOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} {} }}", core::any::type_name::<Self>(), self.0)
    }
}

impl<T> From<HashOf<T>> for Hash {
    fn from(HashOf(hash, _): HashOf<T>) -> Self {
        hash
    }
}

impl<T> Encode for HashOf<T> {
    fn size_hint(&self) -> usize {
        self.0.size_hint()
    }

    fn encode_to<W: Output + ?Sized>(&self, dest: &mut W) {
        self.0.encode_to(dest);
    }
}

impl<T> Decode for HashOf<T> {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        Hash::decode(input).map(Hash::typed)
    }
}

impl<T> Serialize for HashOf<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for HashOf<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Hash::deserialize(deserializer).map(Hash::typed)
    }
}
