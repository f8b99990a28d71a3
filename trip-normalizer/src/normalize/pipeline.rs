//! Batch normalization pipeline.
//!
//! Runs the classifier, ranker and merger over a batch of trips, one route
//! at a time. Routes never share state, so the batch is processed in route
//! id order and aborts on the first error.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use super::NormalizeError;
use super::classify::DirectionClassifier;
use super::merge::{HeadsignAccumulator, HeadsignMerger};
use super::rank::StopRanker;
use super::routes::build_route;
use crate::config::NormalizerConfig;
use crate::domain::{Direction, DomainError, FeedRoute, Route, RouteId, StopTime, Trip, TripId};
use crate::rules::RuleSet;

/// A trip with its final direction, label and stop order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTrip {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub direction: Direction,
    pub headsign: String,
    /// Stops in canonical order, or feed order when the route direction has
    /// no template.
    pub ordered_stops: Vec<StopTime>,
}

/// Normalizes batches of trips against one rule set.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    rules: &'a RuleSet,
    config: NormalizerConfig,
    ranker: StopRanker,
}

impl<'a> Normalizer<'a> {
    pub fn new(rules: &'a RuleSet, config: NormalizerConfig) -> Self {
        let ranker = StopRanker::new(config.rank_spacing);
        Self {
            rules,
            config,
            ranker,
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Derive identifiers and long names for the feed's routes.
    pub fn build_routes(&self, feed: &[FeedRoute]) -> Result<Vec<Route>, NormalizeError> {
        feed.iter()
            .map(|route| build_route(route, self.rules.long_names()))
            .collect()
    }

    /// Classify, rank and merge every trip of the batch.
    ///
    /// Trips with an excluded headsign are dropped. The output is grouped by
    /// route id; within a route, trips keep their input order.
    pub fn normalize(
        &self,
        routes: &[Route],
        trips: Vec<Trip>,
    ) -> Result<Vec<NormalizedTrip>, NormalizeError> {
        let known: HashSet<RouteId> = routes.iter().map(Route::id).collect();
        let total = trips.len();

        let mut by_route: BTreeMap<RouteId, Vec<Trip>> = BTreeMap::new();
        for trip in trips {
            if self.config.is_excluded(&trip.headsign) {
                debug!(trip = %trip.id, headsign = %trip.headsign, "excluded trip");
                continue;
            }
            if !known.contains(&trip.route_id) {
                return Err(NormalizeError::UnknownRoute {
                    route: trip.route_id,
                    trip: trip.id,
                });
            }
            by_route.entry(trip.route_id).or_default().push(trip);
        }

        let mut normalized = Vec::new();
        for (route, trips) in by_route {
            normalized.extend(self.normalize_route(route, trips)?);
        }

        info!(
            routes = routes.len(),
            trips = normalized.len(),
            excluded = total - normalized.len(),
            "normalized batch"
        );
        Ok(normalized)
    }

    fn normalize_route(
        &self,
        route: RouteId,
        mut trips: Vec<Trip>,
    ) -> Result<Vec<NormalizedTrip>, NormalizeError> {
        let classifier = DirectionClassifier::new(self.rules, self.ranker);
        let mut observed = HeadsignAccumulator::new();
        let mut ordered = Vec::with_capacity(trips.len());

        for trip in &mut trips {
            classifier.apply(trip)?;
            observed.observe(trip)?;
            ordered.push(self.order_stops(trip)?);
        }

        let merged = HeadsignMerger::new(self.rules.merges()).merge(&observed)?;
        let relabelled = merged.apply(&mut trips)?;
        debug!(
            route = %route,
            trips = trips.len(),
            relabelled,
            "normalized route"
        );

        trips
            .into_iter()
            .zip(ordered)
            .map(|(trip, ordered_stops)| -> Result<NormalizedTrip, NormalizeError> {
                let not_classified = || DomainError::NotClassified(trip.id.clone());
                let direction = trip.direction().ok_or_else(not_classified)?;
                let headsign = trip.final_headsign().ok_or_else(not_classified)?.to_string();
                Ok(NormalizedTrip {
                    trip_id: trip.id,
                    route_id: trip.route_id,
                    direction,
                    headsign,
                    ordered_stops,
                })
            })
            .collect()
    }

    /// Stops of a classified trip in canonical order.
    fn order_stops(&self, trip: &Trip) -> Result<Vec<StopTime>, NormalizeError> {
        let direction = trip
            .direction()
            .ok_or_else(|| DomainError::NotClassified(trip.id.clone()))?;
        let Some(template) = self.rules.templates().template(trip.route_id, direction) else {
            return Ok(trip.stop_times.clone());
        };

        let ranked = self.ranker.rank(template, &trip.stop_times);
        if !ranked.follows_template() {
            debug!(
                trip = %trip.id,
                route = %trip.route_id,
                direction = %direction,
                "feed stop order disagrees with template"
            );
        }
        Ok(ranked.into_stop_times())
    }
}
