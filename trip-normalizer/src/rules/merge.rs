//! Headsign merge rules.
//!
//! Trips of one route direction can carry different labels (short-turns,
//! time-of-day termini). A merge rule lists the labels that may legitimately
//! be observed together and the one label that represents them all. Any
//! combination of two or more of a rule's labels resolves to its winner.

use std::collections::{BTreeSet, HashMap};

use super::RuleTableError;
use crate::domain::RouteId;

/// Accepted labels and the winning label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    labels: BTreeSet<String>,
    winner: String,
}

impl MergeRule {
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn winner(&self) -> &str {
        &self.winner
    }

    /// True if every observed label is one this rule accepts.
    pub fn accepts(&self, observed: &BTreeSet<&str>) -> bool {
        observed.iter().all(|label| self.labels.contains(*label))
    }
}

/// Merge rules keyed by route.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    rules: HashMap<RouteId, Vec<MergeRule>>,
}

impl MergeTable {
    pub fn builder() -> MergeTableBuilder {
        MergeTableBuilder::default()
    }

    /// Winning label for an observed label set.
    ///
    /// Rules of one route have disjoint label sets, so at most one rule
    /// accepts a set of two or more labels.
    pub fn resolve(&self, route: RouteId, observed: &BTreeSet<&str>) -> Option<&str> {
        self.rules
            .get(&route)?
            .iter()
            .find(|rule| rule.accepts(observed))
            .map(MergeRule::winner)
    }

    pub fn rules(&self, route: RouteId) -> &[MergeRule] {
        self.rules.get(&route).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builder for [`MergeTable`].
#[derive(Debug, Default)]
pub struct MergeTableBuilder {
    entries: Vec<(RouteId, Vec<String>, String)>,
}

impl MergeTableBuilder {
    pub fn rule(mut self, route: RouteId, labels: &[&str], winner: &str) -> Self {
        self.entries.push((
            route,
            labels.iter().map(|s| s.to_string()).collect(),
            winner.to_string(),
        ));
        self
    }

    pub fn build(self) -> Result<MergeTable, RuleTableError> {
        let mut rules: HashMap<RouteId, Vec<MergeRule>> = HashMap::new();

        for (route, labels, winner) in self.entries {
            let labels: BTreeSet<String> = labels.into_iter().collect();
            if labels.len() < 2 {
                return Err(RuleTableError::TrivialMergeRule(route));
            }
            if !labels.contains(&winner) {
                return Err(RuleTableError::ForeignWinner { route, winner });
            }

            let existing = rules.entry(route).or_default();
            if let Some(label) = existing
                .iter()
                .flat_map(|r| r.labels.iter())
                .find(|l| labels.contains(*l))
            {
                return Err(RuleTableError::OverlappingMergeRule {
                    route,
                    label: label.clone(),
                });
            }
            existing.push(MergeRule { labels, winner });
        }

        Ok(MergeTable { rules })
    }
}
