//! Reading the outcome of an extrinsic from the events of one notification.

use healthchain_data_model::events::Event;

/// Verdict on one batch of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The system pallet reported success
    Succeeded,
    /// The system pallet reported failure and no success
    Failed,
    /// Neither outcome is reported yet
    Indeterminate,
}

/// Classify a batch of events.
///
/// A success event wins over a failure event in the same batch.
pub fn classify(events: &[Event]) -> Classification {
    let succeeded = events.iter().any(Event::is_extrinsic_success);
    let failed = events.iter().any(Event::is_extrinsic_failed);

    match (succeeded, failed) {
        (true, _) => Classification::Succeeded,
        (false, true) => Classification::Failed,
        (false, false) => Classification::Indeterminate,
    }
}
