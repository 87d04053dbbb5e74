use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::LoadError;
use crate::route::{normalize, RawRoute, RouteId, RouteRecord};

/// Loaded routes plus their visibility flags. The flag map always has
/// exactly one entry per loaded route.
#[derive(Debug, Default)]
pub struct RouteStore {
    routes: Vec<RouteRecord>,
    visible: HashMap<RouteId, bool>,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub rejected: Vec<LoadError>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every route at once and shows all of them. A record whose
    /// id was already seen in this batch is dropped; the first one wins.
    pub fn load(&mut self, records: Vec<RouteRecord>) -> LoadReport {
        let mut visible = HashMap::with_capacity(records.len());
        let mut routes = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for record in records {
            if visible.insert(record.id, true).is_some() {
                warn!(route_id = %record.id, "dropping route with duplicate id");
                rejected.push(LoadError::DuplicateId(record.id));
                continue;
            }
            routes.push(record);
        }

        self.visible = visible;
        self.routes = routes;

        LoadReport {
            loaded: self.routes.len(),
            rejected,
        }
    }

    /// Normalizes wire records, drops the ones with unusable geometry or a
    /// repeated id and loads the rest.
    pub fn load_raw(&mut self, raw: Vec<RawRoute>) -> LoadReport {
        let mut records = Vec::with_capacity(raw.len());
        let mut rejected = Vec::new();

        for route in raw {
            match normalize(route) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(route_id = %e.route_id(), "dropping route: {}", e);
                    rejected.push(LoadError::from(e));
                }
            }
        }

        let mut report = self.load(records);
        rejected.append(&mut report.rejected);
        report.rejected = rejected;
        info!(
            loaded = report.loaded,
            rejected = report.rejected.len(),
            "routes loaded"
        );

        report
    }

    /// Returns whether the flag changed. Unknown ids are ignored.
    pub fn set_visible(&mut self, id: RouteId, value: bool) -> bool {
        match self.visible.get_mut(&id) {
            Some(flag) if *flag != value => {
                *flag = value;
                true
            }
            _ => false,
        }
    }

    pub fn toggle(&mut self, id: RouteId) -> bool {
        match self.visible.get(&id).copied() {
            Some(current) => self.set_visible(id, !current),
            None => false,
        }
    }

    pub fn is_visible(&self, id: RouteId) -> bool {
        self.visible.get(&id).copied().unwrap_or(false)
    }

    pub fn contains(&self, id: RouteId) -> bool {
        self.visible.contains_key(&id)
    }

    pub fn get(&self, id: RouteId) -> Option<&RouteRecord> {
        self.routes.iter().find(|r| r.id == id)
    }

    /// All routes in load order.
    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    /// Visible routes in load order.
    pub fn visible_routes(&self) -> Vec<&RouteRecord> {
        self.routes
            .iter()
            .filter(|r| self.is_visible(r.id))
            .collect()
    }

    pub fn visibility(&self) -> &HashMap<RouteId, bool> {
        &self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support::{raw_route, record};
    use std::collections::HashSet;

    #[test]
    fn load_shows_everything_and_drops_stale_keys() {
        let mut store = RouteStore::new();
        store.load(vec![record(1, "red", 3), record(2, "blue", 2)]);
        store.set_visible(RouteId(2), false);

        store.load(vec![record(2, "blue", 2), record(3, "green", 4)]);

        let keys: HashSet<RouteId> = store.visibility().keys().copied().collect();
        assert_eq!(keys, HashSet::from([RouteId(2), RouteId(3)]));
        assert!(store.visibility().values().all(|v| *v));
    }

    #[test]
    fn load_raw_keeps_good_records_only() {
        let mut store = RouteStore::new();
        let report = store.load_raw(vec![
            raw_route(1, "Ruta Juarez Centro", r#"{"type":"LineString","coordinates":[[-98.1,26.0],[-98.2,26.1]]}"#),
            raw_route(2, "Ruta Rota", r#"{"type":"LineString","coordinates":[[-98.1,26.0]]}"#),
            raw_route(3, "Ruta Sin Geometria", "nope"),
            raw_route(4, "Ruta Hidalgo", r#"{"type":"LineString","coordinates":[[-98.3,26.0],[-98.4,26.1]]}"#),
        ]);

        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected.len(), 2);

        let keys: HashSet<RouteId> = store.visibility().keys().copied().collect();
        assert_eq!(keys, HashSet::from([RouteId(1), RouteId(4)]));
    }

    #[test]
    fn duplicate_ids_keep_the_first_record() {
        let mut store = RouteStore::new();
        let mut longer = record(1, "blue", 3);
        longer.name = "Ruta 1 bis".to_string();

        let report = store.load(vec![record(1, "red", 2), longer, record(2, "green", 2)]);

        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected, vec![LoadError::DuplicateId(RouteId(1))]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.visible_routes().len(), store.visibility().len());
        assert_eq!(store.get(RouteId(1)).unwrap().geometry.len(), 2);
    }

    #[test]
    fn load_raw_counts_duplicates_with_bad_geometry() {
        let line = r#"{"type":"LineString","coordinates":[[-98.1,26.0],[-98.2,26.1]]}"#;
        let mut store = RouteStore::new();
        let report = store.load_raw(vec![
            raw_route(1, "Ruta Juarez Centro", line),
            raw_route(1, "Ruta Juarez Centro", line),
            raw_route(2, "Ruta Rota", "nope"),
        ]);

        assert_eq!(report.loaded, 1);
        let ids: Vec<RouteId> = report.rejected.iter().map(|e| e.route_id()).collect();
        assert_eq!(ids, vec![RouteId(2), RouteId(1)]);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut store = RouteStore::new();
        store.load(vec![record(1, "red", 3)]);

        assert!(!store.set_visible(RouteId(42), false));
        assert!(!store.toggle(RouteId(42)));
        assert_eq!(store.visibility().len(), 1);
        assert!(!store.contains(RouteId(42)));
    }

    #[test]
    fn visible_routes_keep_load_order() {
        let mut store = RouteStore::new();
        store.load(vec![
            record(5, "red", 2),
            record(1, "blue", 2),
            record(3, "green", 2),
            record(2, "black", 2),
        ]);
        store.toggle(RouteId(1));

        let ids: Vec<RouteId> = store.visible_routes().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RouteId(5), RouteId(3), RouteId(2)]);

        store.toggle(RouteId(1));
        let ids: Vec<RouteId> = store.visible_routes().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RouteId(5), RouteId(1), RouteId(3), RouteId(2)]);
    }
}
