//! Prebuilt runtime calls.

use core::fmt;

use healthchain_crypto::HashOf;
use parity_scale_codec::{Encode, Output};

use crate::{account::AccountId, record::FileHash};

/// Hash of a [`Call`], reported as the transaction hash.
pub type CallHash = HashOf<Call>;

/// Pallet and call indices of the healthchain runtime.
pub mod index {
    /// `MedicalHistory` pallet.
    pub const MEDICAL_HISTORY: u8 = 7;
    /// `MedicalPermissions` pallet.
    pub const MEDICAL_PERMISSIONS: u8 = 8;
    /// `MedicalHistoryReader` pallet.
    pub const MEDICAL_HISTORY_READER: u8 = 9;

    /// `MedicalHistory::create_record`.
    pub const CREATE_RECORD: u8 = 0;
    /// `MedicalPermissions::grant_access`.
    pub const GRANT_ACCESS: u8 = 0;
    /// `MedicalPermissions::revoke_access`.
    pub const REVOKE_ACCESS: u8 = 1;
    /// `MedicalHistoryReader::read_own_data`.
    pub const READ_OWN_DATA: u8 = 0;
    /// `MedicalHistoryReader::read_patient_data`.
    pub const READ_PATIENT_DATA: u8 = 1;
}

/// Named index, either of a pallet or of a call inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Named {
    /// Name as declared in the runtime
    pub name: String,
    /// Position in the runtime metadata
    pub index: u8,
}

impl Named {
    fn new(name: &str, index: u8) -> Self {
        Self {
            name: name.to_owned(),
            index,
        }
    }
}

/// Unsigned description of a chain operation with already encoded arguments.
///
/// Encodes as `pallet_index ++ call_index ++ args`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Call {
    pallet: Named,
    method: Named,
    args: Vec<u8>,
}

impl Call {
    /// Construct a call from its parts. `args` must already be SCALE-encoded.
    pub fn new(pallet: (&str, u8), method: (&str, u8), args: Vec<u8>) -> Self {
        Self {
            pallet: Named::new(pallet.0, pallet.1),
            method: Named::new(method.0, method.1),
            args,
        }
    }

    /// `MedicalHistory::create_record(patient, file_hash)`, signed by the doctor.
    pub fn create_record(patient: &AccountId, file_hash: &FileHash) -> Self {
        Self::new(
            ("MedicalHistory", index::MEDICAL_HISTORY),
            ("create_record", index::CREATE_RECORD),
            (patient, file_hash).encode(),
        )
    }

    /// `MedicalPermissions::grant_access(doctor)`, signed by the patient.
    pub fn grant_access(doctor: &AccountId) -> Self {
        Self::new(
            ("MedicalPermissions", index::MEDICAL_PERMISSIONS),
            ("grant_access", index::GRANT_ACCESS),
            doctor.encode(),
        )
    }

    /// `MedicalPermissions::revoke_access(doctor)`, signed by the patient.
    pub fn revoke_access(doctor: &AccountId) -> Self {
        Self::new(
            ("MedicalPermissions", index::MEDICAL_PERMISSIONS),
            ("revoke_access", index::REVOKE_ACCESS),
            doctor.encode(),
        )
    }

    /// `MedicalHistoryReader::read_own_data(file_hash)`, signed by the patient.
    pub fn read_own_data(file_hash: &FileHash) -> Self {
        Self::new(
            ("MedicalHistoryReader", index::MEDICAL_HISTORY_READER),
            ("read_own_data", index::READ_OWN_DATA),
            file_hash.encode(),
        )
    }

    /// `MedicalHistoryReader::read_patient_data(patient_id, file_hash)`, signed by the doctor.
    pub fn read_patient_data(patient: &AccountId, file_hash: &FileHash) -> Self {
        Self::new(
            ("MedicalHistoryReader", index::MEDICAL_HISTORY_READER),
            ("read_patient_data", index::READ_PATIENT_DATA),
            (patient, file_hash).encode(),
        )
    }

    /// Pallet the call belongs to.
    pub fn pallet(&self) -> &Named {
        &self.pallet
    }

    /// Method of the pallet.
    pub fn method(&self) -> &Named {
        &self.method
    }

    /// Encoded arguments.
    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Hash of the encoded call.
    pub fn hash(&self) -> CallHash {
        CallHash::new(self)
    }
}

impl Encode for Call {
    fn size_hint(&self) -> usize {
        2 + self.args.len()
    }

    fn encode_to<W: Output + ?Sized>(&self, dest: &mut W) {
        dest.push_byte(self.pallet.index);
        dest.push_byte(self.method.index);
        dest.write(&self.args);
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pallet.name, self.method.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_indices_then_args() {
        let doctor = AccountId::new([1; 32]);
        let call = Call::grant_access(&doctor);

        let mut expected = vec![8, 0];
        expected.extend_from_slice(&[1; 32]);
        assert_eq!(call.encode(), expected);
        assert_eq!(call.to_string(), "MedicalPermissions.grant_access");
    }

    #[test]
    fn record_calls_encode_file_hash_as_vec() {
        let patient = AccountId::new([2; 32]);
        let file_hash = FileHash::try_from(b"QmHash".to_vec()).unwrap();
        let call = Call::read_patient_data(&patient, &file_hash);

        let encoded = call.encode();
        assert_eq!(&encoded[..2], &[9, 1]);
        assert_eq!(&encoded[2..34], &[2; 32]);
        // compact length prefix of 6 is 6 << 2
        assert_eq!(encoded[34], 24);
        assert_eq!(&encoded[35..], b"QmHash");
    }

    #[test]
    fn hash_depends_on_call_contents() {
        let doctor = AccountId::new([1; 32]);
        assert_eq!(
            Call::grant_access(&doctor).hash(),
            Call::grant_access(&doctor).hash()
        );
        assert_ne!(
            Call::grant_access(&doctor).hash(),
            Call::revoke_access(&doctor).hash()
        );
    }
}
