//! Healthchain client: submits signed medical-record extrinsics, follows their
//! status until exactly one result, and reads on-chain access permissions.

pub mod actions;
pub mod chain;
pub mod classify;
pub mod content;
pub mod decode;
/// Module with general communication primitives like an HTTP request builder.
pub mod http;
mod http_default;
pub mod permissions;
pub mod promise;
pub mod signer;
pub mod submit;

pub use http_default::{DefaultRequest, DefaultRequestBuilder};

/// Module containing sample configurations for tests.
pub mod samples {
    use healthchain_config::{env::TestEnv, Config};

    /// Get sample client configuration: the defaults, untouched by the process environment.
    #[allow(clippy::expect_used)]
    pub fn get_client_config() -> Config {
        Config::load_with_env(None, &TestEnv::new()).expect("Defaults are valid")
    }
}

pub mod prelude {
    //! Re-exports of the most used types.

    pub use healthchain_data_model::prelude::*;

    pub use super::{
        actions::{AccessRequest, Actions, OwnRecordRequest, RecordRequest},
        chain::{ChainClient, Subscription, TransportError},
        content::{Cid, ContentError, ContentStore, IpfsHttpStore},
        decode::{MetadataRegistry, StaticRegistry},
        permissions::{PermissionGate, PermissionQueryError},
        signer::{Keyring, Signer},
        submit::{Submitter, TransactionConfig, WaitFor},
    };
}
