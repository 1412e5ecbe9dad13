//! User-facing medical actions: build the call, pick the signer, submit.

use std::sync::Arc;

use healthchain_data_model::{
    account::{AccountId, Ss58Prefix},
    call::Call,
    record::FileHash,
    result::{ActionError, ActionResult},
    ParseError,
};
use healthchain_logger::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    chain::ChainClient,
    permissions::PermissionGate,
    signer::Keyring,
    submit::{Submitter, TransactionConfig},
};

/// Patient and doctor of a permission change or check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Owner of the records
    pub patient: AccountId,
    /// Doctor gaining, losing or holding access
    pub doctor: AccountId,
}

/// Record operation performed by a doctor on a patient's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Owner of the record
    pub patient: AccountId,
    /// Doctor performing the operation, and its signer
    pub doctor: AccountId,
    /// Reference to the record contents
    pub file_hash: FileHash,
}

/// Patient reading their own record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnRecordRequest {
    /// Owner and reader of the record
    pub patient: AccountId,
    /// Reference to the record contents
    pub file_hash: FileHash,
}

/// Entry point for the medical actions.
///
/// No action checks permissions itself: the runtime enforces them and reports
/// a dispatch error when they are missing.
pub struct Actions<C: ?Sized> {
    submitter: Submitter<C>,
    gate: PermissionGate<C>,
    keyring: Keyring,
    ss58_prefix: Ss58Prefix,
}

impl<C: ?Sized> core::fmt::Debug for Actions<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Actions")
            .field("submitter", &self.submitter)
            .field("keyring", &self.keyring)
            .field("ss58_prefix", &self.ss58_prefix)
            .finish_non_exhaustive()
    }
}

impl<C: ChainClient + ?Sized> Actions<C> {
    /// Construct the facade over a shared chain connection.
    pub fn new(chain: Arc<C>, keyring: Keyring, config: TransactionConfig) -> Self {
        Self {
            submitter: Submitter::new(Arc::clone(&chain), config),
            gate: PermissionGate::new(chain),
            keyring,
            ss58_prefix: Ss58Prefix::default(),
        }
    }

    /// Construct the facade from a loaded client configuration.
    ///
    /// # Errors
    /// If the configured network prefix is out of range.
    pub fn from_config(
        chain: Arc<C>,
        keyring: Keyring,
        config: &healthchain_config::Config,
    ) -> Result<Self, ParseError> {
        let ss58_prefix = Ss58Prefix::new(config.ss58_prefix)?;
        Ok(Self::new(chain, keyring, config.transaction).with_ss58_prefix(ss58_prefix))
    }

    /// Render addresses for the network `prefix`.
    #[must_use]
    pub fn with_ss58_prefix(mut self, prefix: Ss58Prefix) -> Self {
        self.ss58_prefix = prefix;
        self
    }

    /// Address of `account` on the configured network.
    pub fn address(&self, account: &AccountId) -> String {
        account.to_ss58(self.ss58_prefix)
    }

    /// Patient grants the doctor access to their records.
    pub async fn grant_access(&self, request: &AccessRequest) -> ActionResult {
        self.submit_as(&request.patient, &Call::grant_access(&request.doctor))
            .await
    }

    /// Patient revokes the doctor's access to their records.
    pub async fn revoke_access(&self, request: &AccessRequest) -> ActionResult {
        self.submit_as(&request.patient, &Call::revoke_access(&request.doctor))
            .await
    }

    /// Doctor registers a new record for the patient.
    pub async fn create_record(&self, request: &RecordRequest) -> ActionResult {
        self.submit_as(
            &request.doctor,
            &Call::create_record(&request.patient, &request.file_hash),
        )
        .await
    }

    /// Doctor reads one of the patient's records.
    pub async fn read_patient_data(&self, request: &RecordRequest) -> ActionResult {
        self.submit_as(
            &request.doctor,
            &Call::read_patient_data(&request.patient, &request.file_hash),
        )
        .await
    }

    /// Patient reads one of their own records.
    pub async fn read_own_data(&self, request: &OwnRecordRequest) -> ActionResult {
        self.submit_as(&request.patient, &Call::read_own_data(&request.file_hash))
            .await
    }

    /// Whether the doctor may access the patient's records. See [`PermissionGate::check_access`].
    pub async fn check_access(&self, request: &AccessRequest) -> bool {
        self.gate
            .check_access(&request.patient, &request.doctor)
            .await
    }

    /// The underlying permission gate.
    pub fn permissions(&self) -> &PermissionGate<C> {
        &self.gate
    }

    async fn submit_as(&self, account: &AccountId, call: &Call) -> ActionResult {
        let address = self.address(account);
        let Some(signer) = self.keyring.get(account) else {
            warn!(account = %address, %call, "No signer for acting account");
            return Err(ActionError::UnknownSigner(*account));
        };
        info!(account = %address, %call, "Submitting");
        self.submitter.submit(call, signer.as_ref()).await
    }
}
