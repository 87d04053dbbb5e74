//! The map screen's state and the transitions UI events drive.
//!
//! `MapApp` owns every piece of mutable state (routes, visibility, hover,
//! search text, user position) together with the attached map surface.
//! Each public method is one event handler; after any handler that can
//! change the visible set, the direction overlays are reconciled before
//! returning, so the surface never lags the store.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::camera::CameraController;
use crate::geolocation::{
    GeolocationTracker, LocationSource, LocationState, LocationUpdate, FOUND_POPUP, LOCATE_ZOOM,
};
use crate::error::LocationError;
use crate::highlight::{Highlight, HighlightController};
use crate::overlay::DirectionOverlayManager;
use crate::render::{self, Frame};
use crate::route::{LatLng, RawRoute, RouteId, RouteRecord};
use crate::search;
use crate::store::{LoadReport, RouteStore};
use crate::surface::MapSurface;

pub const INITIAL_CENTER: LatLng = LatLng::new(26.09, -98.28);
pub const INITIAL_ZOOM: u8 = 13;

/// One entry of the sidebar route list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: RouteId,
    pub name: String,
    pub color: String,
    pub fare: String,
    pub schedule: String,
    pub passes_through: Option<String>,
    pub visible: bool,
    pub highlighted: bool,
}

pub struct MapApp<S: MapSurface> {
    store: RouteStore,
    highlight: HighlightController,
    query: String,
    camera: CameraController,
    overlays: DirectionOverlayManager,
    location: GeolocationTracker,
    surface: Option<S>,
    // Failure text that arrived while no map was attached.
    pending_notice: Option<&'static str>,
}

impl<S: MapSurface> MapApp<S> {
    pub fn new(location_timeout: Duration) -> Self {
        Self {
            store: RouteStore::new(),
            highlight: HighlightController::new(),
            query: String::new(),
            camera: CameraController::new(),
            overlays: DirectionOverlayManager::new(),
            location: GeolocationTracker::new(location_timeout),
            surface: None,
            pending_notice: None,
        }
    }

    /// Mounts the map. Replaces (and tears down) any surface already attached.
    /// A location failure reported while unmounted is shown now.
    pub fn attach(&mut self, surface: S) {
        self.detach();
        let surface = self.surface.insert(surface);
        surface.set_view(INITIAL_CENTER, INITIAL_ZOOM);
        if let Some(text) = self.pending_notice.take() {
            surface.notify(text);
        }
        self.overlays.sync(&self.store.visible_routes(), surface);
    }

    /// Unmounts the map, releasing every overlay first.
    pub fn detach(&mut self) -> Option<S> {
        let mut surface = self.surface.take()?;
        self.overlays.release_all(&mut surface);
        Some(surface)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn load(&mut self, records: Vec<RouteRecord>) -> LoadReport {
        let report = self.store.load(records);
        self.after_load();
        report
    }

    pub fn load_raw(&mut self, raw: Vec<RawRoute>) -> LoadReport {
        let report = self.store.load_raw(raw);
        self.after_load();
        report
    }

    fn after_load(&mut self) {
        if let Highlight::Active(id) = self.highlight.state() {
            if !self.store.contains(id) {
                self.highlight.clear();
            }
        }
        self.sync_overlays();
    }

    pub fn set_visible(&mut self, id: RouteId, value: bool) -> bool {
        let changed = self.store.set_visible(id, value);
        if changed {
            self.sync_overlays();
        }
        changed
    }

    /// Checkbox handler.
    pub fn toggle(&mut self, id: RouteId) -> bool {
        let changed = self.store.toggle(id);
        if changed {
            self.sync_overlays();
        }
        changed
    }

    pub fn pointer_enter(&mut self, id: RouteId) {
        self.highlight.pointer_enter(id);
    }

    pub fn pointer_leave(&mut self, id: RouteId) {
        self.highlight.pointer_leave(id);
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Row click: fits the camera to the route. Hidden routes can be
    /// focused too and stay hidden.
    pub fn focus_route(&mut self, id: RouteId) -> bool {
        let Some(route) = self.store.get(id) else {
            return false;
        };
        self.camera.focus(self.surface.as_mut(), &route.geometry)
    }

    /// "¿Dónde estoy?" button. Does nothing until the map is attached.
    pub fn locate<L: LocationSource>(&mut self, source: &mut L) -> bool {
        if self.surface.is_none() {
            debug!("locate ignored, map not attached");
            return false;
        }
        self.location.request(source)
    }

    /// Delivers the device's answer to a pending [`MapApp::locate`].
    pub fn location_result(&mut self, result: Result<LatLng, LocationError>) -> LocationUpdate {
        let update = self.location.complete(result);
        match &update {
            LocationUpdate::Found(fix) => {
                self.camera
                    .center(self.surface.as_mut(), fix.position, LOCATE_ZOOM);
                if let Some(surface) = self.surface.as_mut() {
                    surface.open_popup(fix.position, FOUND_POPUP);
                }
            }
            LocationUpdate::Failed(e) => match self.surface.as_mut() {
                Some(surface) => surface.notify(e.user_message()),
                None => self.pending_notice = Some(e.user_message()),
            },
            LocationUpdate::Ignored => {}
        }
        update
    }

    pub fn location_state(&self) -> &LocationState {
        self.location.state()
    }

    pub fn user_position(&self) -> Option<LatLng> {
        self.location.user_position()
    }

    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    pub fn active_route(&self) -> Option<RouteId> {
        self.highlight.active_in(&self.store)
    }

    pub fn overlay_ids(&self) -> Vec<RouteId> {
        self.overlays.ids().collect()
    }

    /// Sidebar rows for the current search text.
    pub fn list_rows(&self) -> Vec<ListRow> {
        let active = self.active_route();
        search::filter(self.store.routes(), &self.query)
            .into_iter()
            .map(|route| ListRow {
                id: route.id,
                name: route.name.clone(),
                color: route.color.clone(),
                fare: route.fare.clone(),
                schedule: route.schedule.clone(),
                passes_through: route.description.clone().filter(|d| !d.is_empty()),
                visible: self.store.is_visible(route.id),
                highlighted: active == Some(route.id),
            })
            .collect()
    }

    pub fn frame(&self) -> Frame {
        render::render(
            &self.store.visible_routes(),
            self.active_route(),
            self.user_position(),
            self.overlays.specs(),
        )
    }

    fn sync_overlays(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let diff = self.overlays.sync(&self.store.visible_routes(), surface);
        if !diff.is_empty() {
            info!(overlays = self.overlays.len(), "visible routes changed");
        }
    }
}
