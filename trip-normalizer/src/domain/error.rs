//! Domain error types.
//!
//! These errors represent violations of the write-once lifecycle of a trip's
//! normalized fields. They are distinct from classification and merge failures.

use super::TripId;

/// Domain-level errors for trip state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Direction and headsign were already assigned
    #[error("trip {0} is already classified")]
    AlreadyClassified(TripId),

    /// Merged headsign was already written
    #[error("trip {0} already has a merged headsign")]
    AlreadyMerged(TripId),

    /// A merged headsign can only follow classification
    #[error("trip {0} has not been classified")]
    NotClassified(TripId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let id = TripId::new("T1");
        assert_eq!(
            DomainError::AlreadyClassified(id.clone()).to_string(),
            "trip T1 is already classified"
        );
        assert_eq!(
            DomainError::AlreadyMerged(id.clone()).to_string(),
            "trip T1 already has a merged headsign"
        );
        assert_eq!(
            DomainError::NotClassified(id).to_string(),
            "trip T1 has not been classified"
        );
    }
}
