//! Status notifications of a watched extrinsic and the runtime events they carry.

use core::fmt;

use serde::{Deserialize, Serialize};

pub use self::{notification::Notification, stage::LifecycleStage};
use crate::error::DispatchError;

pub mod medical;

/// Namespace of the system pallet.
pub const SYSTEM: &str = "system";
/// Emitted when an extrinsic was applied.
pub const EXTRINSIC_SUCCESS: &str = "ExtrinsicSuccess";
/// Emitted when an extrinsic was included but its dispatch failed.
pub const EXTRINSIC_FAILED: &str = "ExtrinsicFailed";

/// Runtime event attributed to an extrinsic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Pallet that emitted the event, in any letter case
    pub pallet: String,
    /// Event variant name
    pub name: String,
    /// SCALE-encoded fields of the variant
    pub data: Vec<u8>,
}

impl Event {
    /// Construct an event.
    pub fn new(pallet: impl Into<String>, name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            pallet: pallet.into(),
            name: name.into(),
            data,
        }
    }

    /// `System.ExtrinsicSuccess` without fields of interest.
    pub fn extrinsic_success() -> Self {
        Self::new("System", EXTRINSIC_SUCCESS, Vec::new())
    }

    /// `System.ExtrinsicFailed` without fields of interest.
    pub fn extrinsic_failed() -> Self {
        Self::new("System", EXTRINSIC_FAILED, Vec::new())
    }

    /// Whether the event is `name` of `pallet`. Pallets match regardless of ASCII case.
    pub fn is(&self, pallet: &str, name: &str) -> bool {
        self.pallet.eq_ignore_ascii_case(pallet) && self.name == name
    }

    /// Whether this is the system success event.
    pub fn is_extrinsic_success(&self) -> bool {
        self.is(SYSTEM, EXTRINSIC_SUCCESS)
    }

    /// Whether this is the system failure event.
    pub fn is_extrinsic_failed(&self) -> bool {
        self.is(SYSTEM, EXTRINSIC_FAILED)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pallet, self.name)
    }
}

mod stage {
    use super::*;
    use crate::BlockHash;

    /// Status of an extrinsic in the transaction pool and in blocks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(tag = "stage", content = "hash")]
    pub enum LifecycleStage {
        /// Waiting in the pool for an earlier nonce
        Future,
        /// Ready to be included
        Ready,
        /// Gossiped to peers
        Broadcast,
        /// Included in a block that may still be reverted
        InBlock(BlockHash),
        /// The including block was retracted by a reorganisation
        Retracted(BlockHash),
        /// Finality was not reached in time
        FinalityTimeout(BlockHash),
        /// Included in a finalized block
        Finalized(BlockHash),
        /// Replaced by another extrinsic with the given hash
        Usurped(BlockHash),
        /// Dropped from the pool
        Dropped,
        /// Declared invalid by the pool
        Invalid,
    }

    impl LifecycleStage {
        /// Block that includes the extrinsic, for the stages that report one.
        pub const fn block_hash(&self) -> Option<BlockHash> {
            match self {
                Self::InBlock(hash) | Self::Finalized(hash) | Self::FinalityTimeout(hash) => {
                    Some(*hash)
                }
                _ => None,
            }
        }

        /// Whether no further notification can follow this one.
        pub const fn is_terminal(&self) -> bool {
            matches!(
                self,
                Self::Finalized(_)
                    | Self::FinalityTimeout(_)
                    | Self::Usurped(_)
                    | Self::Dropped
                    | Self::Invalid
            )
        }

        /// Terminal stages in which the extrinsic never made it into a block.
        pub const fn is_rejection(&self) -> bool {
            matches!(self, Self::Usurped(_) | Self::Dropped | Self::Invalid)
        }
    }

    impl fmt::Display for LifecycleStage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Future => f.write_str("Future"),
                Self::Ready => f.write_str("Ready"),
                Self::Broadcast => f.write_str("Broadcast"),
                Self::InBlock(hash) => write!(f, "InBlock({hash})"),
                Self::Retracted(hash) => write!(f, "Retracted({hash})"),
                Self::FinalityTimeout(hash) => write!(f, "FinalityTimeout({hash})"),
                Self::Finalized(hash) => write!(f, "Finalized({hash})"),
                Self::Usurped(hash) => write!(f, "Usurped({hash})"),
                Self::Dropped => f.write_str("Dropped"),
                Self::Invalid => f.write_str("Invalid"),
            }
        }
    }
}

mod notification {
    use super::*;

    /// Snapshot delivered by a status subscription.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Notification {
        /// Stage the extrinsic reached
        pub stage: LifecycleStage,
        /// Events of the extrinsic, empty before inclusion
        pub events: Vec<Event>,
        /// Dispatch error, if the runtime reported one
        pub dispatch_error: Option<DispatchError>,
    }

    impl Notification {
        /// Notification without events or error.
        pub const fn new(stage: LifecycleStage) -> Self {
            Self {
                stage,
                events: Vec::new(),
                dispatch_error: None,
            }
        }

        /// Attach events.
        #[must_use]
        pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
            self.events.extend(events);
            self
        }

        /// Attach a dispatch error.
        #[must_use]
        pub fn with_dispatch_error(mut self, error: impl Into<DispatchError>) -> Self {
            self.dispatch_error = Some(error.into());
            self
        }
    }
}
