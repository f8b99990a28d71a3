//! Canonical stop-sequence templates.
//!
//! A template is the reference path a trip of one direction should follow.
//! Each slot holds one stop (strict or optional) or a group of
//! interchangeable stops (equivalent). The slot index is the template
//! position; a stop may appear at more than one position, e.g. a terminal
//! visited twice on a loop.

use std::collections::HashMap;

use super::RuleTableError;
use crate::domain::{Compass, Direction, RouteId, StopId};

/// Relation marker of a template slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Must appear in this relative order.
    Strict,
    /// Any one of the slot's stops may be used; all rank equally.
    Equivalent,
    /// May or may not appear without affecting order validity.
    Optional,
}

/// One position of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSlot {
    stops: Vec<StopId>,
    kind: SlotKind,
}

impl TemplateSlot {
    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Optional slots never count toward order validity or direction matching.
    pub fn is_optional(&self) -> bool {
        self.kind == SlotKind::Optional
    }
}

/// Ordered reference stop sequence for one route direction.
///
/// # Examples
///
/// ```
/// use trip_normalizer::domain::StopId;
/// use trip_normalizer::rules::CanonicalTemplate;
///
/// let template = CanonicalTemplate::builder()
///     .strict("1019")
///     .strict("1255")
///     .equivalent(&["1848", "1849"])
///     .optional("1256")
///     .strict("1231")
///     .build()
///     .unwrap();
///
/// assert_eq!(template.len(), 5);
/// // Equivalent stops share one position
/// let positions = template.positions();
/// assert_eq!(positions[&StopId::parse("1848").unwrap()], vec![2]);
/// assert_eq!(positions[&StopId::parse("1849").unwrap()], vec![2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTemplate {
    slots: Vec<TemplateSlot>,
}

impl CanonicalTemplate {
    pub fn builder() -> CanonicalTemplateBuilder {
        CanonicalTemplateBuilder::default()
    }

    /// A template where every stop is strict.
    pub fn strict_sequence(stops: &[&str]) -> Result<Self, RuleTableError> {
        stops
            .iter()
            .fold(Self::builder(), |b, stop| b.strict(stop))
            .build()
    }

    pub fn slots(&self) -> &[TemplateSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Map from stop to the template positions it occupies, ascending.
    pub fn positions(&self) -> HashMap<StopId, Vec<usize>> {
        let mut positions: HashMap<StopId, Vec<usize>> = HashMap::new();
        for (pos, slot) in self.slots.iter().enumerate() {
            for stop in &slot.stops {
                positions.entry(stop.clone()).or_default().push(pos);
            }
        }
        positions
    }
}

/// Builder for [`CanonicalTemplate`]; slots are appended in call order.
#[derive(Debug, Default)]
pub struct CanonicalTemplateBuilder {
    slots: Vec<TemplateSlot>,
    error: Option<RuleTableError>,
}

impl CanonicalTemplateBuilder {
    pub fn strict(self, stop: &str) -> Self {
        self.push(&[stop], SlotKind::Strict)
    }

    pub fn optional(self, stop: &str) -> Self {
        self.push(&[stop], SlotKind::Optional)
    }

    pub fn equivalent(mut self, stops: &[&str]) -> Self {
        if stops.len() < 2 {
            if self.error.is_none() {
                self.error = Some(RuleTableError::LonelyEquivalent(stops.len()));
            }
            return self;
        }
        self.push(stops, SlotKind::Equivalent)
    }

    fn push(mut self, stops: &[&str], kind: SlotKind) -> Self {
        if self.error.is_some() {
            return self;
        }
        match stops.iter().map(|s| s.parse()).collect::<Result<Vec<StopId>, _>>() {
            Ok(stops) => self.slots.push(TemplateSlot { stops, kind }),
            Err(e) => self.error = Some(RuleTableError::InvalidStop(e)),
        }
        self
    }

    pub fn build(self) -> Result<CanonicalTemplate, RuleTableError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.slots.is_empty() {
            return Err(RuleTableError::EmptyTemplate);
        }
        Ok(CanonicalTemplate { slots: self.slots })
    }
}

/// Label given to trips of a template-driven direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionLabel {
    /// A named terminus, e.g. "City Hall".
    Named(String),
    /// A compass heading, for routes without named termini.
    Compass(Compass),
}

impl DirectionLabel {
    pub fn named(label: impl Into<String>) -> Self {
        DirectionLabel::Named(label.into())
    }

    pub fn text(&self) -> &str {
        match self {
            DirectionLabel::Named(s) => s,
            DirectionLabel::Compass(c) => c.label(),
        }
    }
}

/// A template and the label of its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionTemplate {
    pub label: DirectionLabel,
    pub template: CanonicalTemplate,
}

impl DirectionTemplate {
    pub fn new(label: DirectionLabel, template: CanonicalTemplate) -> Self {
        Self { label, template }
    }
}

/// The templates of one route: one per direction, or only direction 0 for
/// single-direction routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplates {
    outbound: DirectionTemplate,
    inbound: Option<DirectionTemplate>,
}

impl RouteTemplates {
    pub fn two_way(outbound: DirectionTemplate, inbound: DirectionTemplate) -> Self {
        Self {
            outbound,
            inbound: Some(inbound),
        }
    }

    /// A route with no paired inverse template.
    pub fn single_direction(outbound: DirectionTemplate) -> Self {
        Self {
            outbound,
            inbound: None,
        }
    }

    pub fn get(&self, direction: Direction) -> Option<&DirectionTemplate> {
        match direction {
            Direction::Outbound => Some(&self.outbound),
            Direction::Inbound => self.inbound.as_ref(),
        }
    }

    pub fn is_single_direction(&self) -> bool {
        self.inbound.is_none()
    }

    /// Directions that have a template, in index order.
    pub fn directions(&self) -> impl Iterator<Item = (Direction, &DirectionTemplate)> {
        std::iter::once((Direction::Outbound, &self.outbound))
            .chain(self.inbound.as_ref().map(|t| (Direction::Inbound, t)))
    }
}

/// Route templates keyed by route.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    routes: HashMap<RouteId, RouteTemplates>,
}

impl TemplateTable {
    pub fn builder() -> TemplateTableBuilder {
        TemplateTableBuilder::default()
    }

    pub fn get(&self, route: RouteId) -> Option<&RouteTemplates> {
        self.routes.get(&route)
    }

    /// The template for one route direction, if any.
    pub fn template(&self, route: RouteId, direction: Direction) -> Option<&CanonicalTemplate> {
        self.get(route)
            .and_then(|t| t.get(direction))
            .map(|t| &t.template)
    }

    pub fn routes(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.routes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder for [`TemplateTable`].
#[derive(Debug, Default)]
pub struct TemplateTableBuilder {
    entries: Vec<(RouteId, RouteTemplates)>,
}

impl TemplateTableBuilder {
    pub fn route(mut self, route: RouteId, templates: RouteTemplates) -> Self {
        self.entries.push((route, templates));
        self
    }

    pub fn build(self) -> Result<TemplateTable, RuleTableError> {
        let mut routes = HashMap::new();
        for (route, templates) in self.entries {
            if routes.insert(route, templates).is_some() {
                return Err(RuleTableError::DuplicateRoute(route));
            }
        }
        Ok(TemplateTable { routes })
    }
}
