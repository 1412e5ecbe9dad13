//! Data model of the healthchain client: accounts, calls, status
//! notifications, runtime events, dispatch errors and action results.

pub mod account;
pub mod call;
pub mod error;
pub mod events;
pub mod record;
pub mod result;
pub mod storage;

/// Hash of a block as reported by the node.
pub type BlockHash = healthchain_crypto::Hash;

/// Block height.
pub type BlockNumber = u64;

/// Error which occurs when parsing a data model value from text.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum ParseError {
    /// Invalid account id `{input}`: {reason}
    AccountId {
        /// Rejected input
        input: String,
        /// Why it was rejected
        reason: &'static str,
    },
    /// Invalid file hash: {0}
    FileHash(&'static str),
    /// SS58 prefix {0} is out of range
    Ss58Prefix(u16),
}

pub mod prelude {
    //! Re-exports of the most used types.

    pub use healthchain_crypto::{Hash, HashOf};

    pub use super::{
        account::{AccountId, Ss58Prefix, DEFAULT_SS58_PREFIX},
        call::{Call, CallHash},
        error::{DispatchError, ErrorMetadata, ModuleError},
        events::{medical::MedicalEvent, Event, LifecycleStage, Notification},
        record::FileHash,
        result::{ActionError, ActionResult, Receipt},
        storage::StorageQuery,
        BlockHash, BlockNumber, ParseError,
    };
}
