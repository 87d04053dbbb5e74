//! Direction arrows along visible routes.
//!
//! The manager keeps one attached overlay per visible route and reconciles
//! that set against the store after every change. Overlays whose route and
//! drawing inputs are unchanged are left attached; everything else is
//! released or created, so the map never shows an arrow for a hidden route
//! and never recreates arrows that did not change.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::route::{RouteId, RouteRecord};
use crate::surface::{MapSurface, OverlayHandle, OverlaySpec};

pub const ARROW_OFFSET_PERCENT: f64 = 1.0;
pub const ARROW_REPEAT_PX: u32 = 60;
pub const ARROW_PIXEL_SIZE: u32 = 10;
pub const ARROW_COLOR: &str = "white";
pub const ARROW_WEIGHT: f64 = 2.0;
pub const ARROW_OPACITY: f64 = 0.7;

pub fn overlay_spec(route: &RouteRecord) -> OverlaySpec {
    OverlaySpec {
        route_id: route.id,
        path: route.geometry.clone(),
        offset_percent: ARROW_OFFSET_PERCENT,
        repeat_px: ARROW_REPEAT_PX,
        pixel_size: ARROW_PIXEL_SIZE,
        color: ARROW_COLOR.to_string(),
        weight: ARROW_WEIGHT,
        opacity: ARROW_OPACITY,
        polygon: false,
    }
}

#[derive(Debug)]
struct Attached {
    handle: OverlayHandle,
    spec: OverlaySpec,
    // The arrows are drawn in a neutral color, but a recolored route is
    // still treated as a new overlay.
    route_color: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverlayDiff {
    pub added: Vec<RouteId>,
    pub removed: Vec<RouteId>,
    pub replaced: Vec<RouteId>,
}

impl OverlayDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.replaced.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DirectionOverlayManager {
    attached: BTreeMap<RouteId, Attached>,
}

impl DirectionOverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the attached set in line with `visible`.
    pub fn sync<S: MapSurface>(&mut self, visible: &[&RouteRecord], surface: &mut S) -> OverlayDiff {
        let mut diff = OverlayDiff::default();
        let wanted: HashSet<RouteId> = visible.iter().map(|r| r.id).collect();

        let stale: Vec<RouteId> = self
            .attached
            .keys()
            .filter(|id| !wanted.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(old) = self.attached.remove(&id) {
                surface.remove_overlay(old.handle);
                diff.removed.push(id);
            }
        }

        for route in visible {
            let spec = overlay_spec(route);
            match self.attached.get(&route.id) {
                Some(current) if current.spec == spec && current.route_color == route.color => {}
                Some(current) => {
                    surface.remove_overlay(current.handle);
                    let handle = surface.add_overlay(&spec);
                    self.attached.insert(
                        route.id,
                        Attached {
                            handle,
                            spec,
                            route_color: route.color.clone(),
                        },
                    );
                    diff.replaced.push(route.id);
                }
                None => {
                    let handle = surface.add_overlay(&spec);
                    self.attached.insert(
                        route.id,
                        Attached {
                            handle,
                            spec,
                            route_color: route.color.clone(),
                        },
                    );
                    diff.added.push(route.id);
                }
            }
        }

        if !diff.is_empty() {
            debug!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                replaced = diff.replaced.len(),
                "direction overlays updated"
            );
        }

        diff
    }

    /// Detaches every overlay, for when the map itself goes away.
    pub fn release_all<S: MapSurface>(&mut self, surface: &mut S) {
        for (_, overlay) in std::mem::take(&mut self.attached) {
            surface.remove_overlay(overlay.handle);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.attached.keys().copied()
    }

    pub fn handle(&self, id: RouteId) -> Option<OverlayHandle> {
        self.attached.get(&id).map(|a| a.handle)
    }

    /// Specs of the attached overlays, ordered by route id.
    pub fn specs(&self) -> impl Iterator<Item = &OverlaySpec> {
        self.attached.values().map(|a| &a.spec)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::route::LatLng;
    use crate::store::RouteStore;
    use crate::surface::{Command, CommandLog};
    use crate::test_support::record;

    fn overlay_ids(manager: &DirectionOverlayManager) -> HashSet<RouteId> {
        manager.ids().collect()
    }

    fn visible_ids(store: &RouteStore) -> HashSet<RouteId> {
        store.visible_routes().iter().map(|r| r.id).collect()
    }

    fn surface_ids(surface: &CommandLog) -> HashSet<RouteId> {
        surface.overlays().iter().map(|(_, s)| s.route_id).collect()
    }

    #[test]
    fn overlays_follow_visible_set_through_toggles() {
        let mut store = RouteStore::new();
        store.load(vec![record(1, "red", 3), record(2, "blue", 2), record(3, "green", 4)]);
        let mut surface = CommandLog::new();
        let mut manager = DirectionOverlayManager::new();

        manager.sync(&store.visible_routes(), &mut surface);
        assert_eq!(overlay_ids(&manager), visible_ids(&store));

        for _ in 0..3 {
            store.toggle(RouteId(2));
            manager.sync(&store.visible_routes(), &mut surface);
            assert_eq!(overlay_ids(&manager), visible_ids(&store));
            assert_eq!(surface_ids(&surface), visible_ids(&store));
        }

        // odd number of toggles leaves route 2 hidden
        assert!(!store.is_visible(RouteId(2)));
        assert_eq!(surface.overlays().len(), 2);
    }

    #[test]
    fn unchanged_overlays_are_not_recreated() {
        let mut store = RouteStore::new();
        store.load(vec![record(1, "red", 3), record(2, "blue", 2)]);
        let mut surface = CommandLog::new();
        let mut manager = DirectionOverlayManager::new();

        manager.sync(&store.visible_routes(), &mut surface);
        let first = manager.handle(RouteId(1));
        surface.take_commands();

        store.toggle(RouteId(2));
        let diff = manager.sync(&store.visible_routes(), &mut surface);

        assert_eq!(diff.removed, vec![RouteId(2)]);
        assert!(diff.added.is_empty());
        assert_eq!(manager.handle(RouteId(1)), first);
        assert_eq!(surface.commands().len(), 1);

        let diff = manager.sync(&store.visible_routes(), &mut surface);
        assert!(diff.is_empty());
    }

    #[test]
    fn reload_with_new_geometry_or_color_replaces_overlay() {
        let mut store = RouteStore::new();
        store.load(vec![record(1, "red", 3), record(2, "blue", 2)]);
        let mut surface = CommandLog::new();
        let mut manager = DirectionOverlayManager::new();
        manager.sync(&store.visible_routes(), &mut surface);

        let mut moved = record(1, "red", 3);
        moved.geometry.push(LatLng::new(26.5, -98.5));
        let recolored = record(2, "purple", 2);
        store.load(vec![moved, recolored, record(4, "black", 2)]);

        let diff = manager.sync(&store.visible_routes(), &mut surface);
        assert_eq!(diff.replaced, vec![RouteId(1), RouteId(2)]);
        assert_eq!(diff.added, vec![RouteId(4)]);
        assert_eq!(surface_ids(&surface), visible_ids(&store));
        assert_eq!(surface.overlays().len(), 3);
    }

    #[test]
    fn release_all_detaches_everything() {
        let mut store = RouteStore::new();
        store.load(vec![record(1, "red", 3), record(2, "blue", 2)]);
        let mut surface = CommandLog::new();
        let mut manager = DirectionOverlayManager::new();
        manager.sync(&store.visible_routes(), &mut surface);

        manager.release_all(&mut surface);

        assert!(manager.is_empty());
        assert!(surface.overlays().is_empty());
        let removals = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::RemoveOverlay { .. }))
            .count();
        assert_eq!(removals, 2);
    }

    #[test]
    fn arrows_use_neutral_color() {
        let spec = overlay_spec(&record(1, "red", 3));
        assert_eq!(spec.color, ARROW_COLOR);
        assert_eq!(spec.repeat_px, ARROW_REPEAT_PX);
        assert_eq!(spec.path.len(), 3);
    }
}
