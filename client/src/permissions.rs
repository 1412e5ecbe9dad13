//! Read-only check of the on-chain access permission of a doctor to a patient's records.

use std::sync::Arc;

use healthchain_data_model::{account::AccountId, storage::StorageQuery};
use healthchain_logger::prelude::*;
use parity_scale_codec::DecodeAll;

use crate::chain::{ChainClient, TransportError};

/// Permission could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum PermissionQueryError {
    /// Storage query failed: {0}
    Query(#[from] TransportError),
    /// Permission value is not a SCALE boolean: {0}
    Decode(String),
}

/// Answers whether a doctor may access a patient's records.
pub struct PermissionGate<C: ?Sized> {
    chain: Arc<C>,
}

impl<C: ?Sized> Clone for PermissionGate<C> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<C: ?Sized> core::fmt::Debug for PermissionGate<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermissionGate").finish_non_exhaustive()
    }
}

impl<C: ChainClient + ?Sized> PermissionGate<C> {
    /// Construct a gate over `chain`.
    pub fn new(chain: Arc<C>) -> Self {
        Self { chain }
    }

    /// Whether `doctor` may access the records of `patient`.
    ///
    /// A patient always has access to their own records. Failures read as `false`.
    pub async fn check_access(&self, patient: &AccountId, doctor: &AccountId) -> bool {
        self.try_check_access(patient, doctor)
            .await
            .unwrap_or_else(|error| {
                warn!(%patient, %doctor, %error, "Permission query failed, denying access");
                false
            })
    }

    /// Like [`Self::check_access`], but tells a denial apart from a failed lookup.
    ///
    /// # Errors
    /// If the storage query fails or its value does not decode.
    pub async fn try_check_access(
        &self,
        patient: &AccountId,
        doctor: &AccountId,
    ) -> Result<bool, PermissionQueryError> {
        if patient == doctor {
            return Ok(true);
        }

        let query = StorageQuery::permissions(patient, doctor);
        debug!(%query, "Querying permission");
        match self.chain.query_storage(&query).await? {
            None => Ok(false),
            Some(raw) => bool::decode_all(&mut raw.as_slice())
                .map_err(|error| PermissionQueryError::Decode(error.to_string())),
        }
    }
}
