//! Rule table error types.

use crate::domain::{InvalidStopId, RouteId};

/// Errors raised while building a rule table whose invariants do not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleTableError {
    /// A route was registered twice in the same table
    #[error("route {0} has more than one entry")]
    DuplicateRoute(RouteId),

    /// The same suffix is bound to both directions of a route
    #[error("route {route}: suffix {suffix:?} is bound to both directions")]
    OverlappingSuffix { route: RouteId, suffix: String },

    /// A suffix rule with an empty suffix would match every headsign
    #[error("route {0}: empty headsign suffix")]
    EmptySuffix(RouteId),

    /// A route has both suffix rules and a single-direction token
    #[error("route {0} mixes suffix rules with single-direction mode")]
    ConflictingPattern(RouteId),

    /// Template slot could not be built
    #[error("template slot: {0}")]
    InvalidStop(#[from] InvalidStopId),

    /// Equivalent slots need at least two interchangeable stops
    #[error("equivalent slot needs at least two stops, got {0}")]
    LonelyEquivalent(usize),

    /// A template with no slots
    #[error("template has no slots")]
    EmptyTemplate,

    /// A single-direction route was given an inverse template
    #[error("route {0} is single-direction but has a direction 1 template")]
    LoopWithInverseTemplate(RouteId),

    /// Merge rules of one route share a label, so lookups would be ambiguous
    #[error("route {route}: label {label:?} appears in more than one merge rule")]
    OverlappingMergeRule { route: RouteId, label: String },

    /// Winning label is not one of the labels the rule accepts
    #[error("route {route}: merge winner {winner:?} is not among the rule's labels")]
    ForeignWinner { route: RouteId, winner: String },

    /// Merge rule accepting fewer than two labels never applies
    #[error("route {0}: merge rule needs at least two labels")]
    TrivialMergeRule(RouteId),
}
