//! Resolving runtime dispatch errors against chain metadata.

use std::collections::BTreeMap;

use healthchain_data_model::{
    call::index,
    error::{DispatchError, ErrorMetadata, ModuleError},
    result::ActionError,
};
use healthchain_logger::prelude::*;

/// Read-only view of the error section of the runtime metadata.
pub trait MetadataRegistry: Send + Sync {
    /// Name of the pallet at `pallet_index`.
    fn pallet_name(&self, pallet_index: u8) -> Option<&str>;

    /// Name and doc lines of error `error_index` of the pallet at `pallet_index`.
    fn error(&self, pallet_index: u8, error_index: u8) -> Option<(&str, &[String])>;
}

/// Module error indices that the registry does not know.
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum DecodeError {
    /// No pallet with index {0}
    UnknownPallet(u8),
    /// Pallet `{pallet}` has no error with index {error_index}
    UnknownError {
        /// Name of the pallet
        pallet: String,
        /// Unknown error index
        error_index: u8,
    },
}

/// Resolve a module error to its pallet name, error name and docs.
///
/// # Errors
/// If either index is unknown to `registry`.
pub fn decode_module_error(
    registry: &dyn MetadataRegistry,
    error: ModuleError,
) -> Result<ErrorMetadata, DecodeError> {
    let pallet = registry
        .pallet_name(error.pallet_index)
        .ok_or(DecodeError::UnknownPallet(error.pallet_index))?;
    let (name, docs) = registry
        .error(error.pallet_index, error.error_index)
        .ok_or_else(|| DecodeError::UnknownError {
            pallet: pallet.to_owned(),
            error_index: error.error_index,
        })?;

    Ok(ErrorMetadata {
        pallet: pallet.to_owned(),
        name: name.to_owned(),
        docs: docs.to_vec(),
    })
}

/// Turn a dispatch error into the failure reported to the caller.
///
/// Module errors that cannot be decoded degrade to their raw indices.
pub fn describe(registry: &dyn MetadataRegistry, error: &DispatchError) -> ActionError {
    match error {
        DispatchError::Module(module) => match decode_module_error(registry, *module) {
            Ok(metadata) => ActionError::Dispatch(metadata),
            Err(decode_error) => {
                warn!(%module, %decode_error, "Undecodable dispatch error");
                ActionError::DispatchOther(format!("{module} ({decode_error})"))
            }
        },
        DispatchError::Other(message) => ActionError::DispatchOther(message.clone()),
    }
}

#[derive(Debug, Clone, Default)]
struct PalletErrors {
    name: String,
    errors: BTreeMap<u8, (String, Vec<String>)>,
}

/// Registry with a fixed set of pallets and errors.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    pallets: BTreeMap<u8, PalletErrors>,
}

impl StaticRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pallet and its errors, listed in index order as `(name, docs)`.
    #[must_use]
    pub fn with_pallet(mut self, index: u8, name: &str, errors: &[(&str, &[&str])]) -> Self {
        let errors = errors
            .iter()
            .zip(0_u8..)
            .map(|((error, docs), error_index)| {
                let docs = docs.iter().map(|&doc| doc.to_owned()).collect();
                (error_index, ((*error).to_owned(), docs))
            })
            .collect();
        self.pallets.insert(
            index,
            PalletErrors {
                name: name.to_owned(),
                errors,
            },
        );
        self
    }

    /// Errors of the healthchain runtime pallets.
    pub fn healthchain() -> Self {
        Self::new()
            .with_pallet(
                index::MEDICAL_HISTORY,
                "MedicalHistory",
                &[
                    (
                        "RecordAlreadyExists",
                        &["A record with the same hash already exists in the global index."],
                    ),
                    ("RecordNotFound", &["Record does not exist."]),
                    ("NotAuthorized", &["Caller is not authorized."]),
                    (
                        "NoPermission",
                        &["Doctor does not have permission to write for this patient."],
                    ),
                ],
            )
            .with_pallet(
                index::MEDICAL_PERMISSIONS,
                "MedicalPermissions",
                &[(
                    "SelfPermissionNotAllowed",
                    &["A patient cannot grant permission to themselves."],
                )],
            )
            .with_pallet(
                index::MEDICAL_HISTORY_READER,
                "MedicalHistoryReader",
                &[
                    (
                        "RecordNotFound",
                        &["The requested medical record does not exist."],
                    ),
                    (
                        "AccessDenied",
                        &["The caller does not have permission to access the record."],
                    ),
                ],
            )
    }
}

impl MetadataRegistry for StaticRegistry {
    fn pallet_name(&self, pallet_index: u8) -> Option<&str> {
        self.pallets
            .get(&pallet_index)
            .map(|pallet| pallet.name.as_str())
    }

    fn error(&self, pallet_index: u8, error_index: u8) -> Option<(&str, &[String])> {
        self.pallets
            .get(&pallet_index)?
            .errors
            .get(&error_index)
            .map(|(name, docs)| (name.as_str(), docs.as_slice()))
    }
}
