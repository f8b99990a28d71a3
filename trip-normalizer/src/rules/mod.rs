//! Declarative rule tables.
//!
//! Everything agency-specific lives here as data: which headsign endings
//! select which direction, the canonical stop templates of routes whose
//! variants disagree on stop order, the label merge rules, and the fallback
//! long names. The tables are built and validated once and are read-only
//! afterwards.

mod error;
mod merge;
mod names;
mod pattern;
mod template;
mod thunder_bay;

pub use error::RuleTableError;
pub use merge::{MergeRule, MergeTable, MergeTableBuilder};
pub use names::LongNameTable;
pub use pattern::{PatternRule, PatternTable, PatternTableBuilder, SuffixBinding};
pub use template::{
    CanonicalTemplate, CanonicalTemplateBuilder, DirectionLabel, DirectionTemplate,
    RouteTemplates, SlotKind, TemplateSlot, TemplateTable, TemplateTableBuilder,
};
pub use thunder_bay::thunder_bay;

/// All rule tables of one agency.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    patterns: PatternTable,
    templates: TemplateTable,
    merges: MergeTable,
    long_names: LongNameTable,
}

impl RuleSet {
    /// Combine the tables, checking the invariants that span more than one table.
    pub fn new(
        patterns: PatternTable,
        templates: TemplateTable,
        merges: MergeTable,
        long_names: LongNameTable,
    ) -> Result<Self, RuleTableError> {
        for route in patterns.routes() {
            let is_loop = patterns.get(route).is_some_and(PatternRule::is_loop);
            let has_inverse = templates
                .get(route)
                .is_some_and(|t| !t.is_single_direction());
            if is_loop && has_inverse {
                return Err(RuleTableError::LoopWithInverseTemplate(route));
            }
        }

        Ok(Self {
            patterns,
            templates,
            merges,
            long_names,
        })
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    pub fn long_names(&self) -> &LongNameTable {
        &self.long_names
    }
}
