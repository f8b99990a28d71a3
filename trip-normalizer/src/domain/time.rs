//! Schedule time handling.
//!
//! Feeds give stop times as "HH:MM:SS" relative to the start of the service
//! day. Trips running after midnight keep counting, so "25:10:00" is a valid
//! time meaning 01:10 on the following calendar day.

use chrono::Duration;
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of the service day, stored as seconds after service-day midnight.
///
/// Hours may exceed 23 for trips that run past midnight.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleTime(u32);

/// Upper bound on hours accepted from a feed (two days of service).
const MAX_HOURS: u32 = 47;

impl ScheduleTime {
    /// Parse a time from "HH:MM:SS" (or "H:MM:SS") format.
    pub fn parse_hhmmss(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 2 {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hour = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > MAX_HOURS {
            return Err(TimeError::new("hour out of range"));
        }

        if m.len() != 2 {
            return Err(TimeError::new("invalid minute digits"));
        }
        let minute = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        if sec.len() != 2 {
            return Err(TimeError::new("invalid second digits"));
        }
        let second = parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        Ok(ScheduleTime(hour * 3600 + minute * 60 + second))
    }

    /// Seconds after service-day midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Returns the hour, which may be 24 or more.
    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.0 / 60) % 60
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.0 % 60
    }

    /// Returns the duration between two times.
    ///
    /// Negative if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(other.0))
    }
}

impl fmt::Debug for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleTime({self})")
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
