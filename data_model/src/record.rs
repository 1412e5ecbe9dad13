//! Medical record references stored on chain.

use core::{fmt, str::FromStr};

use parity_scale_codec::{Decode, Encode, Input};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseError;

/// Reference to a record held by the content store, bounded to [`FileHash::MAX_LENGTH`] bytes.
///
/// Usually the UTF-8 bytes of a content identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode)]
pub struct FileHash(Vec<u8>);

impl FileHash {
    /// Largest accepted length in bytes.
    pub const MAX_LENGTH: usize = 64;

    /// Reference a content identifier by its text form.
    ///
    /// # Errors
    /// Fails if the identifier is longer than [`Self::MAX_LENGTH`].
    pub fn from_cid(cid: &str) -> Result<Self, ParseError> {
        Self::try_from(cid.as_bytes().to_vec())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Text form when the bytes are UTF-8, which is the case for content identifiers.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }
}

impl TryFrom<Vec<u8>> for FileHash {
    type Error = ParseError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.is_empty() {
            return Err(ParseError::FileHash("empty"));
        }
        if bytes.len() > Self::MAX_LENGTH {
            return Err(ParseError::FileHash("longer than 64 bytes"));
        }
        Ok(Self(bytes))
    }
}

impl Decode for FileHash {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let bytes = Vec::<u8>::decode(input)?;
        if bytes.len() > Self::MAX_LENGTH {
            return Err("file hash exceeds its bound".into());
        }
        Ok(Self(bytes))
    }
}

impl FromStr for FileHash {
    type Err = ParseError;

    /// `0x`-prefixed text is read as hex, anything else as a content identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            Some(digits) => hex::decode(digits)
                .map_err(|_| ParseError::FileHash("invalid hex"))
                .and_then(Self::try_from),
            None => Self::from_cid(s),
        }
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => f.write_str(text),
            None => write!(f, "0x{}", hex::encode(&self.0)),
        }
    }
}

impl fmt::Debug for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileHash({self})")
    }
}

impl Serialize for FileHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
