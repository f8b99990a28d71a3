//! Stop identifiers and stop-time records.

use std::fmt;
use std::str::FromStr;

use super::ScheduleTime;

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id {id:?}: {reason}")]
pub struct InvalidStopId {
    id: String,
    reason: &'static str,
}

/// A validated stop identifier.
///
/// The agency publishes numeric stop ids ("1019"); they are kept as text since
/// they double as the rider-facing stop code, which [`StopId::as_str`] returns.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop identifier. Must be non-empty ASCII digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidStopId {
                id: s.to_string(),
                reason: "must not be empty",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidStopId {
                id: s.to_string(),
                reason: "must be digits only",
            });
        }
        Ok(StopId(s.to_string()))
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StopId {
    type Err = InvalidStopId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StopId::parse(s)
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One visit of a trip to a stop, as given by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTime {
    pub stop_id: StopId,
    /// Feed `stop_sequence`; increasing along the trip but not necessarily contiguous.
    pub sequence: u32,
    /// Cleaned stop name, when the feed gives one.
    pub name: Option<String>,
    pub arrival: Option<ScheduleTime>,
    pub departure: Option<ScheduleTime>,
}

impl StopTime {
    /// Create a stop time without arrival/departure times.
    pub fn new(stop_id: StopId, sequence: u32) -> Self {
        Self {
            stop_id,
            sequence,
            name: None,
            arrival: None,
            departure: None,
        }
    }

    /// Set the arrival and departure times.
    pub fn with_times(mut self, arrival: ScheduleTime, departure: ScheduleTime) -> Self {
        self.arrival = Some(arrival);
        self.departure = Some(departure);
        self
    }
}
