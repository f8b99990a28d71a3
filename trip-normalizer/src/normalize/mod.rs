//! Trip normalization engine.
//!
//! The engine runs in three steps per route:
//! 1. [`DirectionClassifier`] assigns each trip a direction and a label
//! 2. [`StopRanker`] puts each trip's stops in canonical template order
//! 3. [`HeadsignMerger`] collapses the labels of each direction into one
//!
//! [`Normalizer`] drives the steps over a whole batch.

mod classify;
pub mod clean;
mod error;
mod merge;
mod pipeline;
mod rank;
mod routes;

pub use classify::DirectionClassifier;
pub use error::NormalizeError;
pub use merge::{HeadsignAccumulator, HeadsignMerger, MergedHeadsigns};
pub use pipeline::{NormalizedTrip, Normalizer};
pub use rank::{RankedStop, RankedTrip, StopRanker};
pub use routes::build_route;
