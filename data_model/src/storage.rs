//! Read-only storage lookups.

use core::fmt;

use parity_scale_codec::Encode;

use crate::account::AccountId;

/// Key of a storage entry: pallet, item and SCALE-encoded map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageQuery {
    /// Pallet owning the item
    pub pallet: &'static str,
    /// Storage item name
    pub item: &'static str,
    /// Encoded map keys, in declaration order
    pub keys: Vec<Vec<u8>>,
}

impl StorageQuery {
    /// `MedicalPermissions.Permissions(patient, doctor)`, a boolean double map
    /// defaulting to `false`.
    pub fn permissions(patient: &AccountId, doctor: &AccountId) -> Self {
        Self {
            pallet: "MedicalPermissions",
            item: "Permissions",
            keys: vec![patient.encode(), doctor.encode()],
        }
    }
}

impl fmt::Display for StorageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.pallet, self.item)?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "0x{}", hex::encode(key))?;
        }
        f.write_str(")")
    }
}
