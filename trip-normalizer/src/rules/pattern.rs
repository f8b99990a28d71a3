//! Headsign pattern rules.
//!
//! A pattern rule decides a trip's direction from the ending of its raw
//! headsign. Bindings are checked in insertion order and the first match wins,
//! since some suffixes are endings of others.

use std::collections::HashMap;

use tracing::warn;

use super::RuleTableError;
use crate::domain::{Direction, RouteId};

/// A headsign suffix bound to a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixBinding {
    pub suffix: String,
    pub direction: Direction,
}

/// How a route's trips are assigned a direction from their headsign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternRule {
    /// Ordered suffix bindings; the first matching suffix decides.
    Suffix(Vec<SuffixBinding>),
    /// Single-direction route: headsigns ending in `token` are direction 0,
    /// and there is no direction 1.
    Loop { token: String },
}

impl PatternRule {
    /// Direction bound to this headsign, if any binding matches.
    pub fn match_headsign(&self, headsign: &str) -> Option<Direction> {
        match self {
            PatternRule::Suffix(bindings) => bindings
                .iter()
                .find(|b| headsign.ends_with(b.suffix.as_str()))
                .map(|b| b.direction),
            PatternRule::Loop { token } => headsign
                .ends_with(token.as_str())
                .then_some(Direction::Outbound),
        }
    }

    /// Returns true for single-direction routes.
    pub fn is_loop(&self) -> bool {
        matches!(self, PatternRule::Loop { .. })
    }
}

/// Pattern rules keyed by route.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    rules: HashMap<RouteId, PatternRule>,
}

impl PatternTable {
    pub fn builder() -> PatternTableBuilder {
        PatternTableBuilder::default()
    }

    pub fn get(&self, route: RouteId) -> Option<&PatternRule> {
        self.rules.get(&route)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.rules.keys().copied()
    }
}

/// Builder for [`PatternTable`].
///
/// Suffixes are appended per route in call order, which is the order they
/// are checked in. Invariants are validated by [`PatternTableBuilder::build`].
#[derive(Debug, Default)]
pub struct PatternTableBuilder {
    suffixes: Vec<(RouteId, SuffixBinding)>,
    loops: Vec<(RouteId, String)>,
}

impl PatternTableBuilder {
    /// Bind each suffix to `direction` for `route`.
    pub fn suffixes(mut self, route: RouteId, direction: Direction, suffixes: &[&str]) -> Self {
        for suffix in suffixes {
            self.suffixes.push((
                route,
                SuffixBinding {
                    suffix: (*suffix).to_string(),
                    direction,
                },
            ));
        }
        self
    }

    /// Mark `route` as single-direction; headsigns ending in `token` are direction 0.
    pub fn loop_route(mut self, route: RouteId, token: &str) -> Self {
        self.loops.push((route, token.to_string()));
        self
    }

    pub fn build(self) -> Result<PatternTable, RuleTableError> {
        let mut rules: HashMap<RouteId, PatternRule> = HashMap::new();

        for (route, token) in self.loops {
            if token.is_empty() {
                return Err(RuleTableError::EmptySuffix(route));
            }
            if rules.insert(route, PatternRule::Loop { token }).is_some() {
                return Err(RuleTableError::DuplicateRoute(route));
            }
        }

        for (route, binding) in self.suffixes {
            if binding.suffix.is_empty() {
                return Err(RuleTableError::EmptySuffix(route));
            }
            let rule = rules
                .entry(route)
                .or_insert_with(|| PatternRule::Suffix(Vec::new()));
            let PatternRule::Suffix(bindings) = rule else {
                return Err(RuleTableError::ConflictingPattern(route));
            };
            if bindings
                .iter()
                .any(|b| b.suffix == binding.suffix && b.direction != binding.direction)
            {
                return Err(RuleTableError::OverlappingSuffix {
                    route,
                    suffix: binding.suffix,
                });
            }
            bindings.push(binding);
        }

        for (route, rule) in &rules {
            if let PatternRule::Suffix(bindings) = rule {
                warn_on_nested_suffixes(*route, bindings);
            }
        }

        Ok(PatternTable { rules })
    }
}

/// Suffixes of opposite directions where one ends with the other are resolved
/// purely by check order. Flag them so table authors can confirm the order.
fn warn_on_nested_suffixes(route: RouteId, bindings: &[SuffixBinding]) {
    for (i, a) in bindings.iter().enumerate() {
        for b in &bindings[i + 1..] {
            if a.direction != b.direction && b.suffix.ends_with(a.suffix.as_str()) {
                warn!(
                    route = %route,
                    first = %a.suffix,
                    shadowed = %b.suffix,
                    "suffix rule is shadowed by an earlier rule of the other direction"
                );
            }
        }
    }
}
