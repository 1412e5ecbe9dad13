//! Configuration of the healthchain client and its logger.
//!
//! Values are read from an optional TOML file, overridden by environment
//! variables, then validated into complete configs.

pub mod client;
pub mod env;
pub mod logger;
pub mod user;
pub mod util;

pub use client::Config;
