//! Built-in rule set for Thunder Bay Transit.

use super::{
    CanonicalTemplate, DirectionLabel, DirectionTemplate, LongNameTable, MergeTable,
    PatternTable, RouteTemplates, RuleSet, RuleTableError, TemplateTable,
};
use crate::domain::{Compass, Direction, RouteId};

const ROUTE_3C: RouteId = RouteId::new(3 + 3_000);
const ROUTE_3J: RouteId = RouteId::new(3 + 10_000);
const ROUTE_3M: RouteId = RouteId::new(3 + 13_000);

fn id(n: u64) -> RouteId {
    RouteId::new(n)
}

/// Create the Thunder Bay Transit rule set.
///
/// Routes 4, 6, 8 and 12 are template-driven: their direction and label come
/// from the stop templates. Routes 9 and 10 take their direction from headsign
/// suffixes and use templates only for stop ordering.
pub fn thunder_bay() -> Result<RuleSet, RuleTableError> {
    RuleSet::new(patterns()?, templates()?, merges()?, long_names())
}

fn patterns() -> Result<PatternTable, RuleTableError> {
    use Direction::{Inbound, Outbound};

    PatternTable::builder()
        .suffixes(id(1), Outbound, &[" to City Hall", " to Westfort"])
        .suffixes(id(1), Inbound, &[" to Waterfront", " to Current River"])
        .suffixes(
            id(2),
            Outbound,
            &[" to City Hall", " to University", " to Westfort"],
        )
        .suffixes(id(2), Inbound, &[" to Machar", " to Waterfront"])
        .suffixes(ROUTE_3C, Outbound, &[" to Castlegreen Dr"])
        .suffixes(
            ROUTE_3C,
            Inbound,
            &[" to Northwood", " to City Hall", " to Waterfront"],
        )
        .suffixes(ROUTE_3J, Outbound, &[" to Sherwood Dr."])
        .suffixes(ROUTE_3J, Inbound, &[" to Airport", " to Waterfront"])
        .suffixes(
            ROUTE_3M,
            Outbound,
            &[" to City Hall", " to Airport", " to Northwood"],
        )
        .suffixes(
            ROUTE_3M,
            Inbound,
            &[" to Waterfront", " to County Park", " to Jumbo Gardens"],
        )
        .suffixes(id(5), Outbound, &[" to Westfort"])
        .suffixes(id(5), Inbound, &[" to Waterfront", " to College"])
        .suffixes(id(7), Outbound, &[" to Shuniah St."])
        .suffixes(id(7), Inbound, &[" to Waterfront"])
        .suffixes(id(9), Outbound, &[" to Intercity", " to University"])
        .suffixes(id(9), Inbound, &[" to Waterfront"])
        .suffixes(id(10), Outbound, &[" to College"])
        .suffixes(
            id(10),
            Inbound,
            &[" to County Park", " to City Hall", " to Waterfront"],
        )
        .suffixes(id(11), Outbound, &[" to Windsor St."])
        .suffixes(id(11), Inbound, &[" to Waterfront"])
        .suffixes(id(13), Outbound, &[" to County Fair"])
        .suffixes(id(13), Inbound, &[" to Waterfront"])
        .suffixes(id(14), Outbound, &[" to Airport"])
        .suffixes(
            id(14),
            Inbound,
            &[" to Jumbo Gardens", " to Waterfront", " to City Hall"],
        )
        .suffixes(id(16), Outbound, &[" to College", " to Waterfront"])
        .suffixes(id(16), Inbound, &[" to City Hall"])
        .build()
}

fn templates() -> Result<TemplateTable, RuleTableError> {
    let route_4 = RouteTemplates::two_way(
        DirectionTemplate::new(
            DirectionLabel::Compass(Compass::East),
            CanonicalTemplate::builder()
                .strict("1615") // 25th Side Rd. & Rosslyn
                .optional("1520")
                .strict("1521") // Arthur & Valhalla Inn
                .optional("1524")
                .optional("1066")
                .strict("1043") // Frederica & Brown
                .optional("1067")
                .optional("1827")
                .strict("1019") // City Hall Terminal
                .build()?,
        ),
        DirectionTemplate::new(
            DirectionLabel::Compass(Compass::West),
            CanonicalTemplate::builder()
                .strict("1019") // City Hall Terminal
                .strict("1842")
                .optional("1026")
                .optional("1029")
                .strict("1030")
                .optional("1042")
                .strict("1043") // Frederica & Brown
                .optional("1044")
                .strict("1608")
                .optional("1609")
                .strict("1610")
                .strict("1615") // 25th Side Rd. & Rosslyn
                .build()?,
        ),
    );

    let route_6 = RouteTemplates::two_way(
        DirectionTemplate::new(
            DirectionLabel::named("Frederica & Brown"),
            CanonicalTemplate::builder()
                .strict("1590") // Anemki & FWFN Office
                .optional("1595")
                .strict("1043") // Frederica & Brown
                .build()?,
        ),
        DirectionTemplate::new(
            DirectionLabel::named("Anemki"),
            CanonicalTemplate::builder()
                .strict("1043")
                .optional("1582")
                .strict("1590")
                .build()?,
        ),
    );

    let route_8 = RouteTemplates::two_way(
        DirectionTemplate::new(
            DirectionLabel::named("Intercity"),
            // City Hall Terminal, Confederation College, Intercity Shopping Centre
            CanonicalTemplate::strict_sequence(&["1019", "1231", "1006"])?,
        ),
        DirectionTemplate::new(
            DirectionLabel::named("City Hall"),
            CanonicalTemplate::strict_sequence(&["1006", "1231", "1019"])?,
        ),
    );

    let route_9 = RouteTemplates::two_way(
        DirectionTemplate::new(
            DirectionLabel::named("Intercity"),
            CanonicalTemplate::builder()
                .strict("1121") // Waterfront Terminal
                .strict("1467") // River & Balsam
                .optional("1853") // Junot & John, some trips turn here first
                .strict("1468") // River & High
                .strict("1476") // Junot & Windsor
                .strict("1853") // Junot & John
                .strict("1477") // Golf Links & John
                .strict("1222") // Lakehead University
                .strict("1006") // Intercity Shopping Centre
                .build()?,
        ),
        DirectionTemplate::new(
            DirectionLabel::named("Waterfront"),
            CanonicalTemplate::strict_sequence(&["1006", "1222", "1121"])?,
        ),
    );

    let route_10 = RouteTemplates::two_way(
        DirectionTemplate::new(
            DirectionLabel::named("College"),
            CanonicalTemplate::builder()
                .strict("1019") // City Hall Terminal
                .strict("1255")
                .equivalent(&["1848", "1849"])
                .strict("1256")
                .strict("1231") // Confederation College
                .build()?,
        ),
        DirectionTemplate::new(
            DirectionLabel::named("City Hall"),
            CanonicalTemplate::builder()
                .strict("1231")
                .strict("1244")
                .equivalent(&["1848", "1849"])
                .strict("1245")
                .strict("1019")
                .build()?,
        ),
    );

    let route_12 = RouteTemplates::two_way(
        DirectionTemplate::new(
            DirectionLabel::named("Intercity"),
            CanonicalTemplate::builder()
                .strict("1019")
                .optional("1548")
                .strict("1006")
                .build()?,
        ),
        DirectionTemplate::new(
            DirectionLabel::named("City Hall"),
            CanonicalTemplate::builder()
                .strict("1006")
                .optional("1850")
                .strict("1019")
                .build()?,
        ),
    );

    TemplateTable::builder()
        .route(id(4), route_4)
        .route(id(6), route_6)
        .route(id(8), route_8)
        .route(id(9), route_9)
        .route(id(10), route_10)
        .route(id(12), route_12)
        .build()
}

fn merges() -> Result<MergeTable, RuleTableError> {
    MergeTable::builder()
        .rule(id(1), &["City Hall", "Westfort"], "Westfort")
        .rule(id(1), &["Waterfront", "Current River"], "Current River")
        .rule(id(2), &["University", "City Hall", "Westfort"], "Westfort")
        .rule(id(2), &["Machar", "Waterfront"], "Waterfront")
        .rule(ROUTE_3C, &["City Hall", "Waterfront", "Northwood"], "Northwood")
        .rule(ROUTE_3J, &["Waterfront", "Airport"], "Airport")
        .rule(ROUTE_3M, &["Airport", "Northwood", "City Hall"], "City Hall")
        .rule(
            ROUTE_3M,
            &["County Pk", "Jumbo Gdns", "Waterfront"],
            "Waterfront",
        )
        .rule(id(5), &["College", "Waterfront"], "Waterfront")
        .rule(id(9), &["University", "Intercity"], "Intercity")
        .rule(id(10), &["Waterfront", "City Hall", "County Pk"], "County Pk")
        .rule(id(14), &["Waterfront", "City Hall", "Jumbo Gdns"], "Jumbo Gdns")
        .rule(id(16), &["Waterfront", "College"], "College")
        .build()
}

fn long_names() -> LongNameTable {
    [
        ("1", "Mainline"),
        ("2", "Crosstown"),
        ("4", "Neebing"),
        ("5", "Edward"),
        ("6", "Mission Rd."),
        ("7", "Hudson"),
        ("8", "James"),
        ("9", "Junot"),
        ("10", "Northwood"),
        ("11", "John"),
        ("12", "East End"),
        ("13", "John-Jumbo"),
        ("14", "Arthur"),
        ("16", "Balmoral"),
        ("3C", "County Park"),
        ("3J", "Jumbo Gardens"),
        ("3M", "Memorial"),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn builds_without_errors() {
        let rules = thunder_bay().unwrap();
        assert_eq!(rules.patterns().len(), 13);
        assert_eq!(rules.templates().len(), 6);
        assert_eq!(rules.merges().len(), 13);
        assert_eq!(rules.long_names().len(), 17);
    }

    #[test]
    fn lettered_route_ids_match_derivation() {
        assert_eq!(RouteId::parse("3C").unwrap(), ROUTE_3C);
        assert_eq!(RouteId::parse("3J").unwrap(), ROUTE_3J);
        assert_eq!(RouteId::parse("3M").unwrap(), ROUTE_3M);
    }

    #[test]
    fn template_driven_routes_have_no_suffix_rules() {
        let rules = thunder_bay().unwrap();
        for route in [4, 6, 8, 12] {
            assert!(rules.patterns().get(id(route)).is_none());
            assert!(rules.templates().get(id(route)).is_some());
        }
    }

    #[test]
    fn memorial_merge_to_waterfront() {
        let rules = thunder_bay().unwrap();
        let observed: BTreeSet<&str> = ["County Pk", "Jumbo Gdns", "Waterfront"]
            .into_iter()
            .collect();
        assert_eq!(rules.merges().resolve(ROUTE_3M, &observed), Some("Waterfront"));
    }

    #[test]
    fn long_name_fallbacks() {
        let rules = thunder_bay().unwrap();
        assert_eq!(rules.long_names().get("3M"), Some("Memorial"));
        assert_eq!(rules.long_names().get("14"), Some("Arthur"));
        assert_eq!(rules.long_names().get("15"), None);
    }
}
