//! Route construction from feed records.

use super::NormalizeError;
use super::clean::clean_route_long_name;
use crate::domain::{FeedRoute, Route, RouteId};
use crate::rules::LongNameTable;

/// Derive the route identifier and resolve the long name of a feed route.
///
/// A blank or missing feed long name falls back to the lookup table, keyed
/// by short name and then by route code.
pub fn build_route(feed: &FeedRoute, long_names: &LongNameTable) -> Result<Route, NormalizeError> {
    let id = RouteId::parse(&feed.code)?;

    let long_name = match feed.long_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => long_names
            .get(&feed.short_name)
            .or_else(|| long_names.get(&feed.code))
            .ok_or_else(|| NormalizeError::MissingLongName {
                short_name: feed.short_name.clone(),
            })?,
    };

    Ok(Route::new(
        id,
        feed.short_name.clone(),
        clean_route_long_name(long_name),
    ))
}
