//! Domain types for the trip normalizer.
//!
//! This module contains the validated value types the rule tables and the
//! normalization engine work with. Identifier types enforce their invariants
//! at construction time; `Trip` enforces the write-once lifecycle of its
//! normalized fields.

mod direction;
mod error;
mod route;
mod route_id;
mod stop;
mod time;
mod trip;

pub use direction::{Compass, Direction};
pub use error::DomainError;
pub use route::{FeedRoute, Route};
pub use route_id::{InvalidRouteCode, RouteId};
pub use stop::{InvalidStopId, StopId, StopTime};
pub use time::{ScheduleTime, TimeError};
pub use trip::{Classification, ClassifiedBy, Trip, TripId};
