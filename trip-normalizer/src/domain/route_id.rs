//! Route identifier derivation.

use std::fmt;

/// Error returned when a feed route code cannot be turned into a [`RouteId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route code {code:?}: {reason}")]
pub struct InvalidRouteCode {
    code: String,
    reason: &'static str,
}

impl InvalidRouteCode {
    fn new(code: &str, reason: &'static str) -> Self {
        Self {
            code: code.to_string(),
            reason,
        }
    }

    /// The route code that failed to parse.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Offsets added to the numeric part of a route code, keyed by its trailing letter.
///
/// The ranges are disjoint from each other and from plain numeric codes.
const SUFFIX_OFFSETS: [(char, u64); 7] = [
    ('A', 1_000),
    ('C', 3_000),
    ('J', 10_000),
    ('M', 13_000),
    ('N', 14_000),
    ('S', 19_000),
    ('W', 23_000),
];

/// A canonical numeric route identifier.
///
/// Feed route codes are either plain numbers ("14") or a number followed by a
/// variant letter ("3C"). Lettered codes map to `number + offset`, where each
/// recognized letter owns a fixed offset range.
///
/// # Examples
///
/// ```
/// use trip_normalizer::domain::RouteId;
///
/// assert_eq!(RouteId::parse("14").unwrap().value(), 14);
/// assert_eq!(RouteId::parse("3C").unwrap().value(), 3_003);
/// assert_eq!(RouteId::parse("3J").unwrap().value(), 10_003);
///
/// // No digits, or an unknown letter, is rejected
/// assert!(RouteId::parse("C").is_err());
/// assert!(RouteId::parse("3X").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u64);

impl RouteId {
    /// Wrap an already-derived numeric identifier.
    pub const fn new(value: u64) -> Self {
        RouteId(value)
    }

    /// Derive the identifier from a feed route code.
    pub fn parse(code: &str) -> Result<Self, InvalidRouteCode> {
        let code = code.trim();
        if code.is_empty() {
            return Err(InvalidRouteCode::new(code, "empty route code"));
        }

        if code.bytes().all(|b| b.is_ascii_digit()) {
            return code
                .parse::<u64>()
                .map(RouteId)
                .map_err(|_| InvalidRouteCode::new(code, "numeric route code out of range"));
        }

        // First run of digits is the base number
        let digits: String = code
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return Err(InvalidRouteCode::new(code, "no digits in route code"));
        }
        let base: u64 = digits
            .parse()
            .map_err(|_| InvalidRouteCode::new(code, "numeric route code out of range"))?;

        let upper = code.to_ascii_uppercase();
        let offset = SUFFIX_OFFSETS
            .iter()
            .find(|(letter, _)| upper.ends_with(*letter))
            .map(|(_, offset)| *offset)
            .ok_or_else(|| InvalidRouteCode::new(code, "unrecognized route suffix"))?;

        base.checked_add(offset)
            .map(RouteId)
            .ok_or_else(|| InvalidRouteCode::new(code, "numeric route code out of range"))
    }

    /// Returns the numeric identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RouteId> for u64 {
    fn from(value: RouteId) -> Self {
        value.0
    }
}
