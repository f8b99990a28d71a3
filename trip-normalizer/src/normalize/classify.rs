//! Direction classification.
//!
//! Decides each trip's direction index and cleaned label. Rules are tried in
//! this order:
//!
//! 1. A route with a pattern rule takes the feed's direction flag if present,
//!    otherwise the first matching headsign suffix (or the loop token).
//! 2. A template-driven route takes the flag if present, otherwise the
//!    direction whose template the trip's stops match best. The label is the
//!    template's direction label.
//! 3. Any other route needs the feed's direction flag.
//!
//! Nothing is ever defaulted: a trip no rule can place is an error.

use tracing::trace;

use super::NormalizeError;
use super::clean::clean_headsign;
use super::rank::StopRanker;
use crate::domain::{Classification, ClassifiedBy, Direction, Trip};
use crate::rules::{PatternRule, PatternTable, RouteTemplates, RuleSet, TemplateTable};

/// Assigns directions and labels to trips.
#[derive(Debug, Clone, Copy)]
pub struct DirectionClassifier<'a> {
    patterns: &'a PatternTable,
    templates: &'a TemplateTable,
    ranker: StopRanker,
}

impl<'a> DirectionClassifier<'a> {
    pub fn new(rules: &'a RuleSet, ranker: StopRanker) -> Self {
        Self {
            patterns: rules.patterns(),
            templates: rules.templates(),
            ranker,
        }
    }

    /// Work out the classification of `trip` without recording it.
    pub fn classify(&self, trip: &Trip) -> Result<Classification, NormalizeError> {
        let route = trip.route_id;

        if let Some(rule) = self.patterns.get(route) {
            return self.by_pattern(trip, rule);
        }
        if let Some(templates) = self.templates.get(route) {
            return self.by_template(trip, templates);
        }
        match trip.direction_flag {
            Some(direction) => Ok(Classification::new(
                direction,
                clean_headsign(&trip.headsign),
                ClassifiedBy::FeedFlag,
            )),
            None => Err(NormalizeError::Unclassifiable {
                route,
                headsign: trip.headsign.clone(),
            }),
        }
    }

    /// Classify `trip` and record the result on it.
    pub fn apply(&self, trip: &mut Trip) -> Result<(), NormalizeError> {
        let classification = self.classify(trip)?;
        trace!(
            trip = %trip.id,
            direction = %classification.direction,
            headsign = %classification.headsign,
            by = ?classification.by,
            "classified"
        );
        trip.classify(classification)?;
        Ok(())
    }

    fn by_pattern(&self, trip: &Trip, rule: &PatternRule) -> Result<Classification, NormalizeError> {
        let label = clean_headsign(&trip.headsign);

        if let Some(direction) = trip.direction_flag {
            if rule.is_loop() && direction == Direction::Inbound {
                return Err(NormalizeError::LoopDirectionConflict {
                    route: trip.route_id,
                    trip: trip.id.clone(),
                });
            }
            return Ok(Classification::new(direction, label, ClassifiedBy::FeedFlag));
        }

        let direction = rule.match_headsign(&trip.headsign).ok_or_else(|| {
            NormalizeError::Unclassifiable {
                route: trip.route_id,
                headsign: trip.headsign.clone(),
            }
        })?;
        let by = if rule.is_loop() {
            ClassifiedBy::Loop
        } else {
            ClassifiedBy::Suffix
        };
        Ok(Classification::new(direction, label, by))
    }

    fn by_template(
        &self,
        trip: &Trip,
        templates: &RouteTemplates,
    ) -> Result<Classification, NormalizeError> {
        let direction = match trip.direction_flag {
            Some(direction) => direction,
            None => self.infer_direction(trip, templates)?,
        };
        let template = templates.get(direction).ok_or_else(|| {
            NormalizeError::LoopDirectionConflict {
                route: trip.route_id,
                trip: trip.id.clone(),
            }
        })?;
        Ok(Classification::new(
            direction,
            template.label.text(),
            ClassifiedBy::Template,
        ))
    }

    /// The direction whose template the trip matches best. A tie, or no
    /// match at all, is ambiguous.
    fn infer_direction(
        &self,
        trip: &Trip,
        templates: &RouteTemplates,
    ) -> Result<Direction, NormalizeError> {
        let mut scores: Vec<(Direction, usize)> = templates
            .directions()
            .map(|(direction, t)| {
                (
                    direction,
                    self.ranker.match_score(&t.template, &trip.stop_times),
                )
            })
            .collect();
        scores.sort_by(|a, b| b.1.cmp(&a.1));

        match scores.as_slice() {
            [(direction, best), rest @ ..] if *best > 0 && rest.iter().all(|(_, s)| s < best) => {
                Ok(*direction)
            }
            _ => Err(NormalizeError::AmbiguousTemplateDirection {
                route: trip.route_id,
                trip: trip.id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteId, StopId, StopTime, TripId};
    use crate::rules::{
        CanonicalTemplate, DirectionLabel, DirectionTemplate, LongNameTable, MergeTable,
        thunder_bay,
    };

    fn trip(route: u64, headsign: &str) -> Trip {
        Trip::new(TripId::new("T1"), RouteId::new(route), headsign)
    }

    fn with_stops(trip: Trip, ids: &[&str]) -> Trip {
        let stops = ids
            .iter()
            .enumerate()
            .map(|(i, id)| StopTime::new(StopId::parse(id).unwrap(), i as u32 + 1))
            .collect();
        trip.with_stop_times(stops)
    }

    fn classify(rules: &RuleSet, trip: &Trip) -> Result<Classification, NormalizeError> {
        DirectionClassifier::new(rules, StopRanker::default()).classify(trip)
    }

    #[test]
    fn suffix_decides_direction() {
        let rules = thunder_bay().unwrap();
        let c = classify(&rules, &trip(1, "Mainline to City Hall")).unwrap();
        assert_eq!(c, Classification::new(Direction::Outbound, "City Hall", ClassifiedBy::Suffix));

        let c = classify(&rules, &trip(1, "Mainline to Current River")).unwrap();
        assert_eq!(c.direction, Direction::Inbound);
        assert_eq!(c.headsign, "Current River");
    }

    #[test]
    fn lettered_route_suffix() {
        let rules = thunder_bay().unwrap();
        let route = RouteId::parse("3M").unwrap().value();
        let c = classify(&rules, &trip(route, "Memorial to Jumbo Gardens")).unwrap();
        assert_eq!(c.direction, Direction::Inbound);
        assert_eq!(c.headsign, "Jumbo Gdns");
    }

    #[test]
    fn unmatched_headsign_is_fatal() {
        let rules = thunder_bay().unwrap();
        let err = classify(&rules, &trip(1, "Mainline to Airport")).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::Unclassifiable {
                route: RouteId::new(1),
                headsign: "Mainline to Airport".into()
            }
        );
    }

    #[test]
    fn feed_flag_is_kept_and_label_cleaned() {
        let rules = thunder_bay().unwrap();
        // The suffix would say direction 1; the flag wins
        let t = trip(1, "MAINLINE TO WATERFRONT").with_direction_flag(Direction::Outbound);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c, Classification::new(Direction::Outbound, "Waterfront", ClassifiedBy::FeedFlag));
    }

    #[test]
    fn route_without_rules_needs_flag() {
        let rules = thunder_bay().unwrap();
        let err = classify(&rules, &trip(15, "Express to Airport")).unwrap_err();
        assert!(matches!(err, NormalizeError::Unclassifiable { .. }));

        let t = trip(15, "Express to Airport").with_direction_flag(Direction::Inbound);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c.direction, Direction::Inbound);
        assert_eq!(c.headsign, "Airport");
        assert_eq!(c.by, ClassifiedBy::FeedFlag);
    }

    #[test]
    fn template_infers_direction() {
        let rules = thunder_bay().unwrap();
        let t = with_stops(trip(4, "Neebing"), &["1615", "1521", "1043", "1019"]);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c, Classification::new(Direction::Outbound, "East", ClassifiedBy::Template));

        let t = with_stops(trip(4, "Neebing"), &["1019", "1842", "1030", "1043", "1615"]);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c.direction, Direction::Inbound);
        assert_eq!(c.headsign, "West");
    }

    #[test]
    fn template_flag_takes_template_label() {
        let rules = thunder_bay().unwrap();
        let t = trip(8, "James").with_direction_flag(Direction::Inbound);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c, Classification::new(Direction::Inbound, "City Hall", ClassifiedBy::Template));
    }

    #[test]
    fn template_tie_is_ambiguous() {
        let rules = thunder_bay().unwrap();
        for stops in [&["1231"][..], &[][..]] {
            let t = with_stops(trip(8, "James"), stops);
            let err = classify(&rules, &t).unwrap_err();
            assert_eq!(
                err,
                NormalizeError::AmbiguousTemplateDirection {
                    route: RouteId::new(8),
                    trip: TripId::new("T1")
                }
            );
        }
    }

    #[test]
    fn pattern_rule_wins_over_template() {
        let rules = thunder_bay().unwrap();
        // Route 9 has ordering templates but its direction comes from suffixes
        let t = with_stops(trip(9, "Junot to University"), &["1006", "1222", "1121"]);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c.direction, Direction::Outbound);
        assert_eq!(c.by, ClassifiedBy::Suffix);
        assert_eq!(c.headsign, "University");
    }

    #[test]
    fn apply_records_once() {
        let rules = thunder_bay().unwrap();
        let classifier = DirectionClassifier::new(&rules, StopRanker::default());
        let mut t = trip(2, "Crosstown to Westfort");
        classifier.apply(&mut t).unwrap();
        assert_eq!(t.direction(), Some(Direction::Outbound));
        assert_eq!(t.final_headsign(), Some("Westfort"));

        let err = classifier.apply(&mut t).unwrap_err();
        assert!(matches!(err, NormalizeError::Domain(_)));
    }

    pub(super) fn loop_rules() -> RuleSet {
        let patterns = PatternTable::builder()
            .loop_route(RouteId::new(20), " Loop")
            .build()
            .unwrap();
        let templates = TemplateTable::builder()
            .route(
                RouteId::new(21),
                RouteTemplates::single_direction(DirectionTemplate::new(
                    DirectionLabel::named("Downtown"),
                    CanonicalTemplate::strict_sequence(&["1", "2", "1"]).unwrap(),
                )),
            )
            .build()
            .unwrap();
        RuleSet::new(patterns, templates, MergeTable::default(), LongNameTable::new()).unwrap()
    }

    #[test]
    fn loop_route_is_direction_zero() {
        let rules = loop_rules();
        let c = classify(&rules, &trip(20, "Downtown Loop")).unwrap();
        assert_eq!(c.direction, Direction::Outbound);
        assert_eq!(c.by, ClassifiedBy::Loop);

        let t = trip(20, "Downtown Loop").with_direction_flag(Direction::Inbound);
        assert!(matches!(
            classify(&rules, &t),
            Err(NormalizeError::LoopDirectionConflict { .. })
        ));
    }

    #[test]
    fn single_direction_template_rejects_inbound_flag() {
        let rules = loop_rules();
        let t = trip(21, "Downtown").with_direction_flag(Direction::Inbound);
        assert!(matches!(
            classify(&rules, &t),
            Err(NormalizeError::LoopDirectionConflict { .. })
        ));

        let t = with_stops(trip(21, "Downtown"), &["1", "2", "1"]);
        let c = classify(&rules, &t).unwrap();
        assert_eq!(c.direction, Direction::Outbound);
        assert_eq!(c.headsign, "Downtown");
    }
}
