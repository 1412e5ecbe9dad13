//! Complete client configuration.

use core::{fmt, str::FromStr, time::Duration};
use std::path::Path;

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    env::{std_env, ReadEnv},
    logger,
    logger::UnknownVariant,
    user,
};

#[allow(missing_docs)]
pub const DEFAULT_CHAIN_URL: &str = "ws://127.0.0.1:9944";
#[allow(missing_docs)]
pub const DEFAULT_CONTENT_STORE_API_URL: &str = "http://127.0.0.1:5001";
#[allow(missing_docs)]
pub const DEFAULT_CONTENT_STORE_GATEWAY_URL: &str = "http://127.0.0.1:8080";
#[allow(missing_docs)]
pub const DEFAULT_TRANSACTION_STATUS_TIMEOUT: Duration = Duration::from_secs(15);
#[allow(missing_docs)]
pub const DEFAULT_SS58_PREFIX: u16 = 42;
/// Largest network prefix an SS58 address can carry.
pub const MAX_SS58_PREFIX: u16 = 16_383;

/// Stage at which a successful extrinsic is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitFor {
    /// First block that includes the extrinsic with a success event
    #[default]
    InBlock,
    /// Finalized block that includes the extrinsic with a success event
    Finalized,
}

impl FromStr for WaitFor {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_block" => Ok(Self::InBlock),
            "finalized" => Ok(Self::Finalized),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

impl fmt::Display for WaitFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InBlock => "in_block",
            Self::Finalized => "finalized",
        })
    }
}

/// How submitted extrinsics are watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionConfig {
    /// Deadline for signing, broadcast and reaching a terminal status
    pub status_timeout: Duration,
    /// Stage at which success is reported
    pub wait_for: WaitFor,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            status_timeout: DEFAULT_TRANSACTION_STATUS_TIMEOUT,
            wait_for: WaitFor::default(),
        }
    }
}

/// Endpoints of the IPFS-compatible content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentStoreConfig {
    /// HTTP API, e.g. `http://127.0.0.1:5001`
    pub api_url: Url,
    /// HTTP gateway serving `/ipfs/<cid>`
    pub gateway_url: Url,
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Websocket endpoint of the node
    pub chain_url: Url,
    /// Content store endpoints
    pub content_store: ContentStoreConfig,
    /// Submission settings
    pub transaction: TransactionConfig,
    /// Network prefix used when rendering addresses, at most [`MAX_SS58_PREFIX`]
    pub ss58_prefix: u16,
    /// Logger settings
    pub logger: logger::Config,
}

/// An error type for [`Config::load`]
#[derive(thiserror::Error, Debug, Copy, Clone)]
#[error("Failed to load configuration")]
pub struct LoadError;

impl Config {
    /// Loads configuration from a TOML file, with overrides from the process environment.
    ///
    /// # Errors
    /// - unable to read or deserialize the file
    /// - the config is invalid
    pub fn load(path: impl AsRef<Path>) -> error_stack::Result<Self, LoadError> {
        Self::load_with_env(Some(path.as_ref()), &std_env)
    }

    /// Loads configuration from an optional TOML file and the given environment.
    ///
    /// # Errors
    /// See [`Self::load`].
    pub fn load_with_env(
        path: Option<&Path>,
        env: &impl ReadEnv,
    ) -> error_stack::Result<Self, LoadError> {
        let file = match path {
            Some(path) => user::Root::from_file(path).change_context(LoadError)?,
            None => user::Root::default(),
        };
        file.merge(user::Root::from_env(env).change_context(LoadError)?)
            .parse()
            .change_context(LoadError)
    }
}
