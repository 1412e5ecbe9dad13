//! User configuration view: every value optional, as written in a file or the environment.

use core::{str::FromStr, time::Duration};
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;
use url::Url;

use crate::{
    client::{
        ContentStoreConfig, TransactionConfig, WaitFor, DEFAULT_CHAIN_URL,
        DEFAULT_CONTENT_STORE_API_URL, DEFAULT_CONTENT_STORE_GATEWAY_URL, DEFAULT_SS58_PREFIX,
        DEFAULT_TRANSACTION_STATUS_TIMEOUT, MAX_SS58_PREFIX,
    },
    env::ReadEnv,
    logger::{self, Format, Level},
    util::{Emitter, EmitterResultExt},
};

/// Root of the user configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct Root {
    pub chain_url: Option<String>,
    pub ss58_prefix: Option<u16>,
    pub content_store: ContentStore,
    pub transaction: Transaction,
    pub logger: Logger,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct ContentStore {
    pub api_url: Option<String>,
    pub gateway_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct Transaction {
    pub status_timeout_ms: Option<u64>,
    pub wait_for: Option<WaitFor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct Logger {
    pub level: Option<Level>,
    pub format: Option<Format>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("Failed to read the config file")]
    ReadFile,
    #[error("Failed to deserialize file contents as TOML")]
    Toml,
    #[error("Invalid value of environment variable `{key}`")]
    InvalidEnv { key: &'static str },
    #[error("Invalid URL in `{field}`")]
    InvalidUrl { field: &'static str },
    #[error("Unsupported URL scheme: `{scheme}`")]
    UnsupportedUrlScheme { scheme: String },
    #[error("Transaction status timeout must be non-zero")]
    ZeroTimeout,
    #[error("SS58 prefix {0} is out of range")]
    Ss58PrefixOutOfRange(u16),
}

fn read_var<T>(
    env: &impl ReadEnv,
    key: &'static str,
    emitter: &mut Emitter<ParseError>,
) -> Option<T>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let raw = env.read_env(key)?;
    raw.parse::<T>()
        .map_err(|err| {
            Report::new(ParseError::InvalidEnv { key })
                .attach_printable(format!("value: `{raw}`"))
                .attach_printable(err.to_string())
        })
        .ok_or_emit(emitter)
}

impl Root {
    /// Read the user layer from a TOML file.
    ///
    /// # Errors
    /// If the file cannot be read or is not valid TOML of this shape.
    pub fn from_file(path: &Path) -> error_stack::Result<Self, ParseError> {
        let contents = std::fs::read_to_string(path)
            .change_context(ParseError::ReadFile)
            .attach_printable_lazy(|| format!("path: {}", path.display()))?;
        Self::from_toml_str(&contents).attach_printable_lazy(|| format!("path: {}", path.display()))
    }

    /// Read the user layer from TOML text.
    ///
    /// # Errors
    /// If the text is not valid TOML of this shape.
    pub fn from_toml_str(contents: &str) -> error_stack::Result<Self, ParseError> {
        toml::from_str(contents).change_context(ParseError::Toml)
    }

    /// Read the user layer from environment variables.
    ///
    /// # Errors
    /// If a set variable cannot be parsed. Every such variable is reported.
    pub fn from_env(env: &impl ReadEnv) -> error_stack::Result<Self, ParseError> {
        let mut emitter = Emitter::new();

        let root = Self {
            chain_url: read_var(env, "CHAIN_URL", &mut emitter),
            ss58_prefix: read_var(env, "SS58_PREFIX", &mut emitter),
            content_store: ContentStore {
                api_url: read_var(env, "CONTENT_STORE_API_URL", &mut emitter),
                gateway_url: read_var(env, "CONTENT_STORE_GATEWAY_URL", &mut emitter),
            },
            transaction: Transaction {
                status_timeout_ms: read_var(env, "TRANSACTION_STATUS_TIMEOUT_MS", &mut emitter),
                wait_for: read_var(env, "TRANSACTION_WAIT_FOR", &mut emitter),
            },
            logger: Logger {
                level: read_var(env, "LOG_LEVEL", &mut emitter),
                format: read_var(env, "LOG_FORMAT", &mut emitter),
            },
        };

        emitter.into_result()?;
        Ok(root)
    }

    /// Layer `other` on top of `self`: values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            chain_url: other.chain_url.or(self.chain_url),
            ss58_prefix: other.ss58_prefix.or(self.ss58_prefix),
            content_store: ContentStore {
                api_url: other.content_store.api_url.or(self.content_store.api_url),
                gateway_url: other
                    .content_store
                    .gateway_url
                    .or(self.content_store.gateway_url),
            },
            transaction: Transaction {
                status_timeout_ms: other
                    .transaction
                    .status_timeout_ms
                    .or(self.transaction.status_timeout_ms),
                wait_for: other.transaction.wait_for.or(self.transaction.wait_for),
            },
            logger: Logger {
                level: other.logger.level.or(self.logger.level),
                format: other.logger.format.or(self.logger.format),
            },
        }
    }

    /// Validates user configuration for semantic errors and constructs a complete
    /// [`super::Config`], filling in defaults.
    ///
    /// # Errors
    /// If a set of validity errors occurs.
    pub fn parse(self) -> error_stack::Result<super::Config, ParseError> {
        let Self {
            chain_url,
            ss58_prefix,
            content_store:
                ContentStore {
                    api_url,
                    gateway_url,
                },
            transaction:
                Transaction {
                    status_timeout_ms,
                    wait_for,
                },
            logger: Logger { level, format },
        } = self;

        let mut emitter = Emitter::new();

        let chain_url = parse_url(
            "chain_url",
            chain_url.as_deref().unwrap_or(DEFAULT_CHAIN_URL),
            &["ws", "wss"],
        )
        .ok_or_emit(&mut emitter);
        let api_url = parse_url(
            "content_store.api_url",
            api_url.as_deref().unwrap_or(DEFAULT_CONTENT_STORE_API_URL),
            &["http", "https"],
        )
        .ok_or_emit(&mut emitter);
        let gateway_url = parse_url(
            "content_store.gateway_url",
            gateway_url
                .as_deref()
                .unwrap_or(DEFAULT_CONTENT_STORE_GATEWAY_URL),
            &["http", "https"],
        )
        .ok_or_emit(&mut emitter);

        let status_timeout =
            status_timeout_ms.map_or(DEFAULT_TRANSACTION_STATUS_TIMEOUT, Duration::from_millis);
        if status_timeout.is_zero() {
            emitter.emit(
                Report::new(ParseError::ZeroTimeout)
                    .attach_printable("Note: the timeout bounds both broadcast and the status watch"),
            );
        }

        let ss58_prefix = ss58_prefix.unwrap_or(DEFAULT_SS58_PREFIX);
        if ss58_prefix > MAX_SS58_PREFIX {
            emitter.emit(
                Report::new(ParseError::Ss58PrefixOutOfRange(ss58_prefix))
                    .attach_printable(format!("Note: the largest prefix is {MAX_SS58_PREFIX}")),
            );
        }

        emitter.into_result()?;

        match (chain_url, api_url, gateway_url) {
            (Some(chain_url), Some(api_url), Some(gateway_url)) => Ok(super::Config {
                chain_url,
                content_store: ContentStoreConfig {
                    api_url,
                    gateway_url,
                },
                transaction: TransactionConfig {
                    status_timeout,
                    wait_for: wait_for.unwrap_or_default(),
                },
                ss58_prefix,
                logger: logger::Config {
                    level: level.unwrap_or_default(),
                    format: format.unwrap_or_default(),
                },
            }),
            // Unreachable: a missing URL was emitted above.
            _ => Err(Report::new(ParseError::InvalidUrl { field: "chain_url" })),
        }
    }
}

fn parse_url(
    field: &'static str,
    raw: &str,
    schemes: &[&str],
) -> error_stack::Result<Url, ParseError> {
    let url = Url::parse(raw)
        .change_context(ParseError::InvalidUrl { field })
        .attach_printable_lazy(|| format!("value: `{raw}`"))?;
    if !schemes.contains(&url.scheme()) {
        return Err(Report::new(ParseError::UnsupportedUrlScheme {
            scheme: url.scheme().to_owned(),
        })
        .attach_printable(format!("field: `{field}`"))
        .attach_printable(format!("Note: only {} are supported", schemes.join(", "))));
    }
    Ok(url)
}
