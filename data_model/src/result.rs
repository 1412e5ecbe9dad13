//! Settled outcome of one submitted call.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    call::CallHash,
    error::ErrorMetadata,
    events::{medical::MedicalEvent, Event, LifecycleStage},
    BlockHash, BlockNumber,
};

/// Outcome of a submitted call. Exactly one is produced per submission.
pub type ActionResult = Result<Receipt, ActionError>;

/// Proof that a call was included and applied successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Height of the including block
    pub block_number: BlockNumber,
    /// Hash of the submitted call
    pub transaction_hash: CallHash,
    /// Hash of the including block
    pub block_hash: BlockHash,
    /// Events of the extrinsic in that block
    pub events: Vec<Event>,
}

impl Receipt {
    /// Medical pallet events of the extrinsic.
    pub fn medical_events(&self) -> Vec<MedicalEvent> {
        MedicalEvent::collect(&self.events)
    }
}

/// Why a submitted call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum ActionError {
    /// Network error: {0}
    Transport(String),
    /// {0}
    Dispatch(ErrorMetadata),
    /// Dispatch error: {0}
    DispatchOther(String),
    /// Extrinsic finalized with failure
    FinalizedWithFailure,
    /// Extrinsic rejected by the pool: {0}
    Rejected(LifecycleStage),
    /// Extrinsic reached {0} without a success event
    NoSuccess(LifecycleStage),
    /// Status subscription closed before the extrinsic settled
    SubscriptionClosed,
    /// No terminal status within {0:?}
    Timeout(Duration),
    /// Failed to fetch block {hash}: {reason}
    BlockQuery {
        /// Block reported in the success notification
        hash: BlockHash,
        /// Error returned by the node
        reason: String,
    },
    /// No signer available for account {0}
    UnknownSigner(AccountId),
}
