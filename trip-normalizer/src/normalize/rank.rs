//! Stop-sequence ranking against a canonical template.
//!
//! Trips of one route direction often disagree on stop order (short turns,
//! loops, detours). The ranker aligns a trip's feed-ordered stops with the
//! template of its direction and gives every stop occurrence an integer rank:
//!
//! - a stop bound to template slot `i` ranks `(i + 1) * spacing`; stops of an
//!   equivalent slot share that rank;
//! - a stop absent from the template is interpolated between the nearest
//!   bound stops before and after it in feed order;
//! - ties are broken by the feed sequence number, so the result is a total
//!   order.

use std::collections::HashMap;

use crate::domain::{StopId, StopTime};
use crate::rules::CanonicalTemplate;

/// A stop occurrence with its canonical rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedStop {
    pub stop_time: StopTime,
    pub rank: i64,
    /// Template slot this occurrence was bound to, if any.
    pub slot: Option<usize>,
    /// Position in the trip's feed-ordered stop list.
    pub feed_index: usize,
}

/// A trip's stops in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTrip {
    stops: Vec<RankedStop>,
    follows_template: bool,
}

impl RankedTrip {
    /// Stops sorted by (rank, sequence).
    pub fn stops(&self) -> &[RankedStop] {
        &self.stops
    }

    pub fn into_stop_times(self) -> Vec<StopTime> {
        self.stops.into_iter().map(|s| s.stop_time).collect()
    }

    /// True if the feed order of the non-optional template stops already
    /// agrees with the template.
    pub fn follows_template(&self) -> bool {
        self.follows_template
    }

    /// Rank of the stop at `feed_index` in the original stop list.
    pub fn rank_of(&self, feed_index: usize) -> Option<i64> {
        self.stops
            .iter()
            .find(|s| s.feed_index == feed_index)
            .map(|s| s.rank)
    }

    /// Returns true if the canonical order differs from feed order.
    pub fn is_reordered(&self) -> bool {
        self.stops
            .iter()
            .enumerate()
            .any(|(i, s)| s.feed_index != i)
    }
}

/// Ranks trips against templates.
#[derive(Debug, Clone, Copy)]
pub struct StopRanker {
    spacing: i64,
}

impl Default for StopRanker {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl StopRanker {
    /// Create a ranker; `spacing` is the rank distance between consecutive
    /// template slots. Values below 1 are raised to 1.
    pub fn new(spacing: i64) -> Self {
        Self {
            spacing: spacing.max(1),
        }
    }

    pub fn spacing(&self) -> i64 {
        self.spacing
    }

    /// Rank `stops` (feed order) against `template`.
    pub fn rank(&self, template: &CanonicalTemplate, stops: &[StopTime]) -> RankedTrip {
        let slots = bind_slots(template, stops);
        let anchors: Vec<(usize, i64)> = slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|s| (i, self.slot_rank(s))))
            .collect();

        let mut ranked: Vec<RankedStop> = stops
            .iter()
            .enumerate()
            .map(|(i, stop_time)| {
                let rank = match slots[i] {
                    Some(slot) => self.slot_rank(slot),
                    None => interpolate(&anchors, i),
                };
                RankedStop {
                    stop_time: stop_time.clone(),
                    rank,
                    slot: slots[i],
                    feed_index: i,
                }
            })
            .collect();

        // Stable: equal (rank, sequence) keeps feed order
        ranked.sort_by_key(|s| (s.rank, s.stop_time.sequence));

        RankedTrip {
            stops: ranked,
            follows_template: is_non_decreasing(&required_slots(template, &slots)),
        }
    }

    /// How well `stops` follow `template`: the largest number of
    /// non-optional template stops visited in template order.
    pub fn match_score(&self, template: &CanonicalTemplate, stops: &[StopTime]) -> usize {
        let slots = bind_slots(template, stops);
        longest_non_decreasing(&required_slots(template, &slots))
    }

    fn slot_rank(&self, slot: usize) -> i64 {
        (slot as i64 + 1).saturating_mul(self.spacing)
    }
}

/// Bind each stop occurrence to a template slot.
///
/// A stop listed at several template positions binds its occurrences in
/// feed order. When the trip visits the stop at least as often as the
/// template lists it, the k-th occurrence takes the k-th position. A trip
/// with fewer visits skips positions: each occurrence takes a position after
/// the one taken by the previous occurrence of the same stop, preferring the
/// first position not before the most recently bound slot. Occurrences left
/// without a position are unbound.
fn bind_slots(template: &CanonicalTemplate, stops: &[StopTime]) -> Vec<Option<usize>> {
    let positions = template.positions();
    let mut visits: HashMap<&StopId, usize> = HashMap::new();
    for stop_time in stops {
        *visits.entry(&stop_time.stop_id).or_default() += 1;
    }

    let mut seen: HashMap<&StopId, usize> = HashMap::new();
    let mut last_taken: HashMap<&StopId, usize> = HashMap::new();
    let mut cursor = 0;

    stops
        .iter()
        .map(|stop_time| {
            let id = &stop_time.stop_id;
            let candidates = positions.get(id)?;
            let occurrence = seen.entry(id).or_default();
            let k = *occurrence;
            *occurrence += 1;

            let slot = if visits.get(id).copied().unwrap_or_default() >= candidates.len() {
                candidates.get(k).copied()?
            } else {
                let after_previous: Vec<usize> = match last_taken.get(id) {
                    Some(&taken) => candidates.iter().copied().filter(|&p| p > taken).collect(),
                    None => candidates.clone(),
                };
                after_previous
                    .iter()
                    .copied()
                    .find(|&p| p >= cursor)
                    .or_else(|| after_previous.first().copied())?
            };
            last_taken.insert(id, slot);
            cursor = slot;
            Some(slot)
        })
        .collect()
}

/// Slots of bound, non-optional occurrences in feed order.
fn required_slots(template: &CanonicalTemplate, slots: &[Option<usize>]) -> Vec<usize> {
    slots
        .iter()
        .flatten()
        .copied()
        .filter(|&s| !template.slots()[s].is_optional())
        .collect()
}

/// Rank for an unbound stop at feed index `index`.
fn interpolate(anchors: &[(usize, i64)], index: usize) -> i64 {
    let split = anchors.partition_point(|&(i, _)| i < index);
    let prev = split.checked_sub(1).map(|p| anchors[p]);
    let next = anchors.get(split).copied();

    let index = index as i64;
    match (prev, next) {
        (Some((ip, rp)), Some((inx, rn))) => {
            let (ip, inx) = (ip as i64, inx as i64);
            rp.saturating_add(rn.saturating_sub(rp).saturating_mul(index - ip) / (inx - ip))
        }
        (Some((ip, rp)), None) => rp.saturating_add(index - ip as i64),
        (None, Some((inx, rn))) => rn.saturating_sub(inx as i64 - index),
        (None, None) => index,
    }
}

fn is_non_decreasing(values: &[usize]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

fn longest_non_decreasing(values: &[usize]) -> usize {
    let mut tails: Vec<usize> = Vec::new();
    for &v in values {
        let idx = tails.partition_point(|&t| t <= v);
        if idx == tails.len() {
            tails.push(v);
        } else {
            tails[idx] = v;
        }
    }
    tails.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(ids: &[&str]) -> Vec<StopTime> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| StopTime::new(StopId::parse(id).unwrap(), i as u32 + 1))
            .collect()
    }

    fn order(trip: &RankedTrip) -> Vec<&str> {
        trip.stops()
            .iter()
            .map(|s| s.stop_time.stop_id.as_str())
            .collect()
    }

    #[test]
    fn missing_strict_stop_keeps_order() {
        let template = CanonicalTemplate::strict_sequence(&["1019", "1842", "1043", "1615"]).unwrap();
        let trip = StopRanker::default().rank(&template, &stops(&["1019", "1043", "1615"]));

        assert_eq!(order(&trip), vec!["1019", "1043", "1615"]);
        let ranks: Vec<i64> = trip.stops().iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1000, 3000, 4000]);
        assert!(trip.follows_template());
        assert!(!trip.is_reordered());
    }

    #[test]
    fn equivalent_stops_rank_equally() {
        let template = CanonicalTemplate::builder()
            .strict("1019")
            .strict("1255")
            .equivalent(&["1848", "1849"])
            .strict("1256")
            .strict("1231")
            .build()
            .unwrap();
        let ranker = StopRanker::default();
        let a = ranker.rank(&template, &stops(&["1019", "1255", "1848", "1256", "1231"]));
        let b = ranker.rank(&template, &stops(&["1019", "1255", "1849", "1256", "1231"]));

        assert_eq!(a.rank_of(2), b.rank_of(2));
        let ranks = |t: &RankedTrip| t.stops().iter().map(|s| s.rank).collect::<Vec<_>>();
        assert_eq!(ranks(&a), ranks(&b));
        assert_eq!(order(&b), vec!["1019", "1255", "1849", "1256", "1231"]);
    }

    #[test]
    fn reorders_against_template() {
        let template = CanonicalTemplate::strict_sequence(&["1006", "1231", "1019"]).unwrap();
        let trip = StopRanker::default().rank(&template, &stops(&["1231", "1006", "1019"]));
        assert_eq!(order(&trip), vec!["1006", "1231", "1019"]);
        assert!(!trip.follows_template());
        assert!(trip.is_reordered());
    }

    #[test]
    fn unknown_stop_is_interpolated() {
        let template = CanonicalTemplate::strict_sequence(&["1019", "1043", "1615"]).unwrap();
        let trip = StopRanker::default().rank(
            &template,
            &stops(&["1019", "1500", "1501", "1043", "1615", "1700"]),
        );
        assert_eq!(trip.rank_of(0), Some(1000));
        assert_eq!(trip.rank_of(1), Some(1333));
        assert_eq!(trip.rank_of(2), Some(1666));
        assert_eq!(trip.rank_of(3), Some(2000));
        // Only a previous anchor
        assert_eq!(trip.rank_of(5), Some(3001));
        assert!(!trip.is_reordered());
    }

    #[test]
    fn unknown_stop_before_first_anchor() {
        let template = CanonicalTemplate::strict_sequence(&["1019", "1043"]).unwrap();
        let trip = StopRanker::default().rank(&template, &stops(&["1500", "1501", "1019", "1043"]));
        assert_eq!(trip.rank_of(0), Some(998));
        assert_eq!(trip.rank_of(1), Some(999));
        assert!(!trip.is_reordered());
    }

    #[test]
    fn no_anchors_keeps_feed_order() {
        let template = CanonicalTemplate::strict_sequence(&["1019", "1043"]).unwrap();
        let trip = StopRanker::default().rank(&template, &stops(&["1502", "1500", "1501"]));
        assert_eq!(order(&trip), vec!["1502", "1500", "1501"]);
        assert_eq!(StopRanker::default().match_score(&template, &stops(&["1502"])), 0);
    }

    #[test]
    fn recurring_stop_binds_in_feed_order() {
        let template = CanonicalTemplate::builder()
            .strict("1121")
            .strict("1467")
            .optional("1853")
            .strict("1468")
            .strict("1476")
            .strict("1853")
            .strict("1477")
            .build()
            .unwrap();
        let ranker = StopRanker::default();

        // Visits the recurring stop twice
        let trip = ranker.rank(
            &template,
            &stops(&["1121", "1467", "1853", "1468", "1476", "1853", "1477"]),
        );
        let slots: Vec<Option<usize>> = trip.stops().iter().map(|s| s.slot).collect();
        assert_eq!(
            slots,
            vec![Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
        );

        // Visits it only once, late: binds to the later slot
        let trip = ranker.rank(
            &template,
            &stops(&["1121", "1467", "1468", "1476", "1853", "1477"]),
        );
        assert_eq!(trip.stops()[4].slot, Some(5));
        assert!(!trip.is_reordered());
        assert!(trip.follows_template());
    }

    #[test]
    fn recurring_stop_after_other_template_stop() {
        let template = CanonicalTemplate::strict_sequence(&["1001", "1009", "1002", "1009", "1003"]).unwrap();
        let trip = StopRanker::default().rank(&template, &stops(&["1001", "1002", "1009", "1009", "1003"]));

        let by_feed: Vec<(usize, Option<usize>)> = (0..5)
            .map(|i| {
                let s = trip.stops().iter().find(|s| s.feed_index == i).unwrap();
                (i, s.slot)
            })
            .collect();
        assert_eq!(
            by_feed,
            vec![(0, Some(0)), (1, Some(2)), (2, Some(1)), (3, Some(3)), (4, Some(4))]
        );
        assert_eq!(order(&trip), vec!["1001", "1009", "1002", "1009", "1003"]);
        assert!(!trip.follows_template());
    }

    #[test]
    fn extra_occurrence_is_unbound() {
        let template = CanonicalTemplate::strict_sequence(&["1019", "1043"]).unwrap();
        let trip = StopRanker::default().rank(&template, &stops(&["1019", "1043", "1019"]));
        assert_eq!(trip.stops()[2].slot, None);
        assert_eq!(trip.rank_of(2), Some(2001));
    }

    #[test]
    fn ties_broken_by_sequence() {
        let template = CanonicalTemplate::builder()
            .strict("1019")
            .equivalent(&["1848", "1849"])
            .build()
            .unwrap();
        // Both equivalents visited, feed lists the later sequence first
        let mut feed = stops(&["1019", "1849", "1848"]);
        feed[1].sequence = 5;
        feed[2].sequence = 3;
        let trip = StopRanker::default().rank(&template, &feed);
        assert_eq!(order(&trip), vec!["1019", "1848", "1849"]);
    }

    #[test]
    fn optional_stops_do_not_count() {
        let template = CanonicalTemplate::builder()
            .strict("1590")
            .optional("1595")
            .strict("1043")
            .build()
            .unwrap();
        let ranker = StopRanker::default();
        // Optional stop out of place does not break the order check
        let trip = ranker.rank(&template, &stops(&["1590", "1043", "1595"]));
        assert!(trip.follows_template());
        assert_eq!(ranker.match_score(&template, &stops(&["1590", "1595", "1043"])), 2);
        assert_eq!(ranker.match_score(&template, &stops(&["1595"])), 0);
    }

    #[test]
    fn match_score_counts_in_order_stops() {
        let outbound = CanonicalTemplate::strict_sequence(&["1019", "1231", "1006"]).unwrap();
        let inbound = CanonicalTemplate::strict_sequence(&["1006", "1231", "1019"]).unwrap();
        let ranker = StopRanker::default();
        let feed = stops(&["1019", "1231", "1006"]);
        assert_eq!(ranker.match_score(&outbound, &feed), 3);
        assert_eq!(ranker.match_score(&inbound, &feed), 1);
    }

    #[test]
    fn spacing_is_at_least_one() {
        assert_eq!(StopRanker::new(0).spacing(), 1);
        assert_eq!(StopRanker::new(-5).spacing(), 1);
    }

    #[test]
    fn huge_spacing_saturates() {
        let template = CanonicalTemplate::strict_sequence(&["1019", "1043", "1615"]).unwrap();
        let ranker = StopRanker::new(i64::MAX);
        let trip = ranker.rank(&template, &stops(&["1500", "1019", "1501", "1043", "1615", "1502"]));
        assert_eq!(trip.stops().len(), 6);
        assert_eq!(trip.rank_of(4), Some(i64::MAX));
        assert_eq!(trip.rank_of(5), Some(i64::MAX));
        assert_eq!(trip.rank_of(0), Some(i64::MAX - 1));
    }
}
