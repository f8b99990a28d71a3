//! Route type.

use super::RouteId;

/// A route as seen by the normalizer.
///
/// Immutable once constructed; the long name has already been resolved
/// (from the feed or from the agency lookup table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    id: RouteId,
    short_name: String,
    long_name: String,
}

impl Route {
    pub fn new(id: RouteId, short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        Self {
            id,
            short_name: short_name.into(),
            long_name: long_name.into(),
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }
}

/// Route fields as supplied by the feed, before identifier derivation and
/// long-name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRoute {
    /// Feed `route_id`, e.g. "3C".
    pub code: String,
    pub short_name: String,
    pub long_name: Option<String>,
}

impl FeedRoute {
    pub fn new(code: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            short_name: short_name.into(),
            long_name: None,
        }
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }
}
