//! Headsign merging.
//!
//! After classification, the labels seen in each route direction are
//! collected by a [`HeadsignAccumulator`]. The merger then looks every set of
//! two or more labels up in the merge table and produces the winning label
//! per direction; [`MergedHeadsigns::apply`] writes it onto the trips. A
//! direction with a single label is already canonical and is left alone.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::NormalizeError;
use crate::domain::{Direction, DomainError, RouteId, Trip, TripId};
use crate::rules::MergeTable;

/// Labels observed per route direction, with the trips carrying each.
///
/// Owned by the caller so that each batch (or each route) can use its own.
#[derive(Debug, Clone, Default)]
pub struct HeadsignAccumulator {
    observed: BTreeMap<(RouteId, Direction), BTreeMap<String, Vec<TripId>>>,
}

impl HeadsignAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classified trip's current label.
    pub fn observe(&mut self, trip: &Trip) -> Result<(), NormalizeError> {
        let (Some(direction), Some(label)) = (trip.direction(), trip.final_headsign()) else {
            return Err(DomainError::NotClassified(trip.id.clone()).into());
        };
        self.observed
            .entry((trip.route_id, direction))
            .or_default()
            .entry(label.to_string())
            .or_default()
            .push(trip.id.clone());
        Ok(())
    }

    /// Distinct labels seen for one route direction.
    pub fn labels(&self, route: RouteId, direction: Direction) -> BTreeSet<&str> {
        self.observed
            .get(&(route, direction))
            .map(|labels| labels.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Trips observed with `label` in one route direction.
    pub fn trips(&self, route: RouteId, direction: Direction, label: &str) -> &[TripId] {
        self.observed
            .get(&(route, direction))
            .and_then(|labels| labels.get(label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of route directions observed.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    fn groups(&self) -> impl Iterator<Item = (RouteId, Direction, BTreeSet<&str>)> {
        self.observed.iter().map(|(&(route, direction), labels)| {
            (route, direction, labels.keys().map(String::as_str).collect())
        })
    }
}

/// Resolves observed label sets with a merge table.
#[derive(Debug, Clone, Copy)]
pub struct HeadsignMerger<'a> {
    table: &'a MergeTable,
}

impl<'a> HeadsignMerger<'a> {
    pub fn new(table: &'a MergeTable) -> Self {
        Self { table }
    }

    /// Winning label of every route direction that needs merging.
    ///
    /// Fails on the first label set the table does not anticipate.
    pub fn merge(&self, observed: &HeadsignAccumulator) -> Result<MergedHeadsigns, NormalizeError> {
        let mut winners = BTreeMap::new();

        for (route, direction, labels) in observed.groups() {
            if labels.len() < 2 {
                continue;
            }
            let Some(winner) = self.table.resolve(route, &labels) else {
                return Err(NormalizeError::UnanticipatedMerge {
                    route,
                    direction,
                    labels: labels.iter().map(|s| s.to_string()).collect(),
                });
            };
            debug!(
                route = %route,
                direction = %direction,
                labels = ?labels,
                winner,
                "merged headsigns"
            );
            winners.insert((route, direction), winner.to_string());
        }

        Ok(MergedHeadsigns { winners })
    }
}

/// Winning labels per route direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedHeadsigns {
    winners: BTreeMap<(RouteId, Direction), String>,
}

impl MergedHeadsigns {
    pub fn get(&self, route: RouteId, direction: Direction) -> Option<&str> {
        self.winners.get(&(route, direction)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// Overwrite the label of every trip in a merged direction that does not
    /// already carry the winner. Returns the number of trips relabelled.
    pub fn apply(&self, trips: &mut [Trip]) -> Result<usize, NormalizeError> {
        let mut relabelled = 0;
        for trip in trips.iter_mut() {
            let Some(direction) = trip.direction() else {
                continue;
            };
            let Some(winner) = self.get(trip.route_id, direction) else {
                continue;
            };
            if trip.final_headsign() != Some(winner) {
                trip.set_merged_headsign(winner)?;
                relabelled += 1;
            }
        }
        Ok(relabelled)
    }
}
