//! Typed events of the healthchain pallets.

use parity_scale_codec::{DecodeAll, Encode};
use serde::{Deserialize, Serialize};

use super::Event;
use crate::{account::AccountId, record::FileHash};

/// Event emitted by one of the medical pallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicalEvent {
    /// `MedicalPermissions.AccessGranted`
    AccessGranted {
        /// Patient who granted access
        patient: AccountId,
        /// Doctor who received access
        doctor: AccountId,
    },
    /// `MedicalPermissions.AccessRevoked`
    AccessRevoked {
        /// Patient who revoked access
        patient: AccountId,
        /// Doctor who lost access
        doctor: AccountId,
    },
    /// `MedicalHistory.RecordCreated`
    RecordCreated {
        /// Owner of the record
        patient: AccountId,
        /// Doctor who created it
        doctor: AccountId,
        /// Reference to the record contents
        hash: FileHash,
    },
    /// `MedicalHistoryReader.OwnDataAccessed`
    OwnDataAccessed {
        /// Reader and owner
        patient: AccountId,
        /// Record that was read
        file_hash: FileHash,
    },
    /// `MedicalHistoryReader.PatientDataAccessed`
    PatientDataAccessed {
        /// Reader
        doctor: AccountId,
        /// Owner of the record
        patient: AccountId,
        /// Record that was read
        file_hash: FileHash,
    },
}

/// Why an [`Event`] could not be read as a [`MedicalEvent`].
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
pub enum EventDecodeError {
    /// `{0}` is not an event of the medical pallets
    Unrecognized(String),
    /// Malformed fields of `{event}`: {reason}
    Malformed {
        /// Event name
        event: String,
        /// Codec error text
        reason: String,
    },
}

impl MedicalEvent {
    /// Pallet and name the event is reported under.
    pub const fn id(&self) -> (&'static str, &'static str) {
        match self {
            Self::AccessGranted { .. } => ("MedicalPermissions", "AccessGranted"),
            Self::AccessRevoked { .. } => ("MedicalPermissions", "AccessRevoked"),
            Self::RecordCreated { .. } => ("MedicalHistory", "RecordCreated"),
            Self::OwnDataAccessed { .. } => ("MedicalHistoryReader", "OwnDataAccessed"),
            Self::PatientDataAccessed { .. } => ("MedicalHistoryReader", "PatientDataAccessed"),
        }
    }

    /// Extract every medical event from a batch, skipping unrelated ones.
    ///
    /// Medical events whose fields fail to decode are logged and skipped.
    pub fn collect<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<Self> {
        events
            .into_iter()
            .filter_map(|event| match Self::try_from(event) {
                Ok(decoded) => Some(decoded),
                Err(EventDecodeError::Unrecognized(_)) => None,
                Err(error @ EventDecodeError::Malformed { .. }) => {
                    tracing::warn!(%error, "Skipping medical event");
                    None
                }
            })
            .collect()
    }
}

impl From<&MedicalEvent> for Event {
    fn from(event: &MedicalEvent) -> Self {
        let data = match event {
            MedicalEvent::AccessGranted { patient, doctor }
            | MedicalEvent::AccessRevoked { patient, doctor } => (patient, doctor).encode(),
            MedicalEvent::RecordCreated {
                patient,
                doctor,
                hash,
            } => (patient, doctor, hash).encode(),
            MedicalEvent::OwnDataAccessed { patient, file_hash } => (patient, file_hash).encode(),
            MedicalEvent::PatientDataAccessed {
                doctor,
                patient,
                file_hash,
            } => (doctor, patient, file_hash).encode(),
        };
        let (pallet, name) = event.id();
        Event::new(pallet, name, data)
    }
}

impl TryFrom<&Event> for MedicalEvent {
    type Error = EventDecodeError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        let malformed = |err: parity_scale_codec::Error| EventDecodeError::Malformed {
            event: event.to_string(),
            reason: err.to_string(),
        };
        let input = &mut &event.data[..];

        let decoded = if event.is("MedicalPermissions", "AccessGranted") {
            let (patient, doctor) = DecodeAll::decode_all(input).map_err(malformed)?;
            Self::AccessGranted { patient, doctor }
        } else if event.is("MedicalPermissions", "AccessRevoked") {
            let (patient, doctor) = DecodeAll::decode_all(input).map_err(malformed)?;
            Self::AccessRevoked { patient, doctor }
        } else if event.is("MedicalHistory", "RecordCreated") {
            let (patient, doctor, hash) = DecodeAll::decode_all(input).map_err(malformed)?;
            Self::RecordCreated {
                patient,
                doctor,
                hash,
            }
        } else if event.is("MedicalHistoryReader", "OwnDataAccessed") {
            let (patient, file_hash) = DecodeAll::decode_all(input).map_err(malformed)?;
            Self::OwnDataAccessed { patient, file_hash }
        } else if event.is("MedicalHistoryReader", "PatientDataAccessed") {
            let (doctor, patient, file_hash) = DecodeAll::decode_all(input).map_err(malformed)?;
            Self::PatientDataAccessed {
                doctor,
                patient,
                file_hash,
            }
        } else {
            return Err(EventDecodeError::Unrecognized(event.to_string()));
        };
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FileHash {
        FileHash::from_cid("QmRecord").unwrap()
    }

    #[test]
    fn decodes_what_the_pallet_emits() {
        let original = MedicalEvent::PatientDataAccessed {
            doctor: AccountId::new([1; 32]),
            patient: AccountId::new([2; 32]),
            file_hash: record(),
        };
        let event = Event::from(&original);
        assert_eq!(event.to_string(), "MedicalHistoryReader.PatientDataAccessed");
        assert_eq!(MedicalEvent::try_from(&event), Ok(original));
    }

    #[test]
    fn collect_skips_system_events() {
        let granted = MedicalEvent::AccessGranted {
            patient: AccountId::new([2; 32]),
            doctor: AccountId::new([1; 32]),
        };
        let batch = [Event::extrinsic_success(), Event::from(&granted)];
        assert_eq!(MedicalEvent::collect(&batch), vec![granted]);
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let event = Event::new("MedicalHistory", "RecordCreated", vec![0; 10]);
        assert!(matches!(
            MedicalEvent::try_from(&event),
            Err(EventDecodeError::Malformed { .. })
        ));
        assert_eq!(
            MedicalEvent::try_from(&Event::extrinsic_failed()),
            Err(EventDecodeError::Unrecognized("System.ExtrinsicFailed".to_owned()))
        );
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let granted = MedicalEvent::AccessGranted {
            patient: AccountId::new([2; 32]),
            doctor: AccountId::new([1; 32]),
        };
        let mut data = Event::from(&granted).data;
        data.push(0);
        let event = Event::new("MedicalPermissions", "AccessGranted", data);

        assert!(matches!(
            MedicalEvent::try_from(&event),
            Err(EventDecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn collect_drops_malformed_events() {
        let revoked = MedicalEvent::AccessRevoked {
            patient: AccountId::new([2; 32]),
            doctor: AccountId::new([1; 32]),
        };
        let batch = [
            Event::new("MedicalHistory", "RecordCreated", vec![0; 10]),
            Event::from(&revoked),
        ];
        assert_eq!(MedicalEvent::collect(&batch), vec![revoked]);
    }
}
