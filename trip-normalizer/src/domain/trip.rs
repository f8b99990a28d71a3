//! Trip type with write-once normalized fields.
//!
//! A `Trip` is built from feed input and is read-only apart from two fields:
//! the classification (direction + headsign), written once by the classifier,
//! and the merged headsign, written at most once by the merger as the very
//! last step.

use std::fmt;

use super::{Direction, DomainError, RouteId, StopTime};

/// Feed trip identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId(String);

impl TripId {
    pub fn new(id: impl Into<String>) -> Self {
        TripId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TripId({})", self.0)
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedBy {
    /// The feed supplied `direction_id`; only the label was cleaned.
    FeedFlag,
    /// A headsign suffix rule matched.
    Suffix,
    /// The route is single-direction.
    Loop,
    /// The route is template-driven; label comes from the template.
    Template,
}

/// Direction and label assigned to a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub direction: Direction,
    pub headsign: String,
    pub by: ClassifiedBy,
}

impl Classification {
    pub fn new(direction: Direction, headsign: impl Into<String>, by: ClassifiedBy) -> Self {
        Self {
            direction,
            headsign: headsign.into(),
            by,
        }
    }
}

/// A scheduled trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,
    pub route_id: RouteId,
    /// Raw `trip_headsign` text from the feed.
    pub headsign: String,
    /// Feed `direction_id`, when present.
    pub direction_flag: Option<Direction>,
    /// Stop visits in feed order.
    pub stop_times: Vec<StopTime>,
    classification: Option<Classification>,
    merged_headsign: Option<String>,
}

impl Trip {
    pub fn new(id: TripId, route_id: RouteId, headsign: impl Into<String>) -> Self {
        Self {
            id,
            route_id,
            headsign: headsign.into(),
            direction_flag: None,
            stop_times: Vec::new(),
            classification: None,
            merged_headsign: None,
        }
    }

    pub fn with_direction_flag(mut self, direction: Direction) -> Self {
        self.direction_flag = Some(direction);
        self
    }

    pub fn with_stop_times(mut self, stop_times: Vec<StopTime>) -> Self {
        self.stop_times = stop_times;
        self
    }

    /// Record the classifier's result. Fails if already classified.
    pub fn classify(&mut self, classification: Classification) -> Result<(), DomainError> {
        if self.classification.is_some() {
            return Err(DomainError::AlreadyClassified(self.id.clone()));
        }
        self.classification = Some(classification);
        Ok(())
    }

    /// Overwrite the displayed headsign with the merged label.
    ///
    /// Allowed once, after classification. The direction is untouched.
    pub fn set_merged_headsign(&mut self, label: impl Into<String>) -> Result<(), DomainError> {
        if self.classification.is_none() {
            return Err(DomainError::NotClassified(self.id.clone()));
        }
        if self.merged_headsign.is_some() {
            return Err(DomainError::AlreadyMerged(self.id.clone()));
        }
        self.merged_headsign = Some(label.into());
        Ok(())
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.classification.as_ref().map(|c| c.direction)
    }

    /// The label shown to riders: the merged label if any, else the classified one.
    pub fn final_headsign(&self) -> Option<&str> {
        self.merged_headsign
            .as_deref()
            .or_else(|| self.classification.as_ref().map(|c| c.headsign.as_str()))
    }
}
