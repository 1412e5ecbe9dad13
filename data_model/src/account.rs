//! Account identifiers and their SS58 text form.

use core::{fmt, str::FromStr};

use healthchain_crypto::{blake2b_512, PublicKey};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseError;

/// Generic substrate network prefix, used by development chains.
pub const DEFAULT_SS58_PREFIX: Ss58Prefix = Ss58Prefix(42);

const CHECKSUM_PREIMAGE_PREFIX: &[u8] = b"SS58PRE";
const CHECKSUM_LENGTH: usize = 2;
const KEY_LENGTH: usize = 32;

/// Network identifier carried by an SS58 address, below 16384.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ss58Prefix(u16);

impl Ss58Prefix {
    /// Largest prefix the two-byte layout can carry.
    pub const MAX: u16 = 16_383;

    /// Validate a network prefix.
    ///
    /// # Errors
    /// If `prefix` is above [`Self::MAX`].
    pub fn new(prefix: u16) -> Result<Self, ParseError> {
        if prefix > Self::MAX {
            return Err(ParseError::Ss58Prefix(prefix));
        }
        Ok(Self(prefix))
    }

    /// Numeric value.
    pub const fn get(self) -> u16 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode(self) -> Vec<u8> {
        let prefix = self.0;
        if prefix < 64 {
            vec![prefix as u8]
        } else {
            let first = ((prefix & 0b0000_0000_1111_1100) as u8 >> 2) | 0b0100_0000;
            let second = ((prefix >> 8) as u8) | (((prefix & 0b0000_0000_0000_0011) as u8) << 6);
            vec![first, second]
        }
    }
}

impl Default for Ss58Prefix {
    fn default() -> Self {
        DEFAULT_SS58_PREFIX
    }
}

impl TryFrom<u16> for Ss58Prefix {
    type Error = ParseError;

    fn try_from(prefix: u16) -> Result<Self, Self::Error> {
        Self::new(prefix)
    }
}

impl fmt::Display for Ss58Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identification of an account: the 32-byte public key of its owner.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct AccountId([u8; KEY_LENGTH]);

impl AccountId {
    /// Construct from raw bytes.
    pub const fn new(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the identifier.
    pub const fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Render as an SS58 address for the network `prefix`.
    pub fn to_ss58(&self, prefix: Ss58Prefix) -> String {
        let mut payload = prefix.encode();
        payload.extend_from_slice(&self.0);
        let checksum = ss58_checksum(&payload);
        payload.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
        bs58::encode(payload).into_string()
    }

    /// Parse an SS58 address, returning the identifier and its network prefix.
    ///
    /// # Errors
    /// Fails on invalid base58, unknown prefix layout, wrong length or a checksum mismatch.
    pub fn from_ss58(address: &str) -> Result<(Self, Ss58Prefix), ParseError> {
        let error = |reason| ParseError::AccountId {
            input: address.to_owned(),
            reason,
        };

        let data = bs58::decode(address)
            .into_vec()
            .map_err(|_| error("not valid base58"))?;
        let (prefix, prefix_len) = match data.first() {
            Some(&first) if first < 64 => (u16::from(first), 1),
            Some(&first) if first < 128 => {
                let second = *data.get(1).ok_or_else(|| error("truncated prefix"))?;
                let lower = (first << 2) | (second >> 6);
                let upper = second & 0b0011_1111;
                (u16::from(lower) | (u16::from(upper) << 8), 2)
            }
            Some(_) => return Err(error("reserved prefix")),
            None => return Err(error("empty address")),
        };

        if data.len() != prefix_len + KEY_LENGTH + CHECKSUM_LENGTH {
            return Err(error("unexpected length"));
        }
        let (body, checksum) = data.split_at(prefix_len + KEY_LENGTH);
        if ss58_checksum(body)[..CHECKSUM_LENGTH] != *checksum {
            return Err(error("checksum mismatch"));
        }

        let mut key = [0; KEY_LENGTH];
        key.copy_from_slice(&body[prefix_len..]);
        Ok((Self(key), Ss58Prefix(prefix)))
    }
}

fn ss58_checksum(body: &[u8]) -> [u8; 64] {
    let mut preimage = Vec::with_capacity(CHECKSUM_PREIMAGE_PREFIX.len() + body.len());
    preimage.extend_from_slice(CHECKSUM_PREIMAGE_PREFIX);
    preimage.extend_from_slice(body);
    blake2b_512(preimage)
}

impl From<PublicKey> for AccountId {
    fn from(key: PublicKey) -> Self {
        Self(key.to_bytes())
    }
}

impl FromStr for AccountId {
    type Err = ParseError;

    /// Accepts either an SS58 address of any network or `0x`-prefixed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix("0x") {
            let mut bytes = [0; KEY_LENGTH];
            hex::decode_to_slice(digits, &mut bytes).map_err(|_| ParseError::AccountId {
                input: s.to_owned(),
                reason: "expected 32 hex-encoded bytes",
            })?;
            return Ok(Self(bytes));
        }
        Self::from_ss58(s).map(|(account, _)| account)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ss58(DEFAULT_SS58_PREFIX))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({self})")
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
