//! Runtime dispatch errors reported alongside an included extrinsic.

use core::fmt;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Error of a pallet, addressed by indices into the runtime metadata.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct ModuleError {
    /// Index of the pallet that raised the error
    pub pallet_index: u8,
    /// Index of the error variant inside the pallet
    pub error_index: u8,
}

impl ModuleError {
    /// Construct a module error.
    pub const fn new(pallet_index: u8, error_index: u8) -> Self {
        Self {
            pallet_index,
            error_index,
        }
    }
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Module {{ index: {}, error: {} }}",
            self.pallet_index, self.error_index
        )
    }
}

/// Why the runtime refused to apply an included extrinsic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
pub enum DispatchError {
    /// Error raised by a pallet
    Module(ModuleError),
    /// Any other dispatch error, in its textual form
    #[from(ignore)]
    Other(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(error) => error.fmt(f),
            Self::Other(message) => f.write_str(message),
        }
    }
}

/// Human readable description of a module error, taken from the runtime metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorMetadata {
    /// Pallet name, e.g. `MedicalHistory`
    pub pallet: String,
    /// Error variant name, e.g. `RecordNotFound`
    pub name: String,
    /// Doc lines of the variant
    pub docs: Vec<String>,
}

impl ErrorMetadata {
    /// Construct the description from borrowed parts.
    pub fn new(pallet: &str, name: &str, docs: &[&str]) -> Self {
        Self {
            pallet: pallet.to_owned(),
            name: name.to_owned(),
            docs: docs.iter().map(|&doc| doc.to_owned()).collect(),
        }
    }
}

impl fmt::Display for ErrorMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.pallet, self.name, self.docs.join(" "))
    }
}
