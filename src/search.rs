use crate::route::RouteRecord;

/// Routes whose name or description contains `query`, ignoring case, in
/// their original order. An empty query keeps every route.
pub fn filter<'a>(routes: &'a [RouteRecord], query: &str) -> Vec<&'a RouteRecord> {
    if query.is_empty() {
        return routes.iter().collect();
    }

    let needle = query.to_lowercase();
    routes
        .iter()
        .filter(|route| {
            route.name.to_lowercase().contains(&needle)
                || route
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}
