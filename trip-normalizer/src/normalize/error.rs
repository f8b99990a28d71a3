//! Normalization error types.
//!
//! Every variant is fatal for the batch: a silently defaulted direction or
//! label would corrupt every trip grouped under the same route. The only
//! remedy is a rule-table update.

use crate::domain::{Direction, DomainError, InvalidRouteCode, RouteId, TripId};

/// Errors raised while classifying, ranking or merging trips.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// No pattern rule matches the trip's raw headsign
    #[error("route {route}: unclassifiable trip headsign {headsign:?}")]
    Unclassifiable { route: RouteId, headsign: String },

    /// The labels observed in one direction match no merge rule
    #[error("route {route} direction {direction}: unanticipated headsign combination {labels:?}")]
    UnanticipatedMerge {
        route: RouteId,
        direction: Direction,
        labels: Vec<String>,
    },

    /// Route code has no digits or an unknown suffix
    #[error("malformed route: {0}")]
    MalformedRouteCode(#[from] InvalidRouteCode),

    /// Feed omits the long name and the lookup table has none
    #[error("route {short_name:?} has no long name")]
    MissingLongName { short_name: String },

    /// Template-driven trip matches both directions equally, or neither
    #[error("route {route}: trip {trip} does not match a single direction template")]
    AmbiguousTemplateDirection { route: RouteId, trip: TripId },

    /// Feed flags a single-direction route's trip as direction 1
    #[error("route {route} is single-direction but trip {trip} is flagged direction 1")]
    LoopDirectionConflict { route: RouteId, trip: TripId },

    /// Trip refers to a route that was not supplied
    #[error("trip {trip} refers to unknown route {route}")]
    UnknownRoute { route: RouteId, trip: TripId },

    /// Write-once violation on a trip
    #[error(transparent)]
    Domain(#[from] DomainError),
}
