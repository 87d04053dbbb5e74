//! Imperative side of the map: the commands the engine issues to whatever
//! widget actually paints tiles and shapes.

use serde::Serialize;
use tracing::debug;

use crate::route::{LatLng, RouteId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

/// Screen-space margin kept around a fitted region, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Padding {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OverlayHandle(pub u64);

/// Repeated arrow heads drawn along a route path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySpec {
    pub route_id: RouteId,
    pub path: Vec<LatLng>,
    /// First mark, as a percentage of the path length.
    pub offset_percent: f64,
    pub repeat_px: u32,
    pub pixel_size: u32,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    /// Open chevrons rather than filled triangles.
    pub polygon: bool,
}

pub trait MapSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8);
    fn fit_bounds(&mut self, bounds: Bounds, padding: Padding);
    fn add_overlay(&mut self, spec: &OverlaySpec) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);
    fn open_popup(&mut self, at: LatLng, text: &str);
    /// User-visible notice outside the map (an alert, a toast).
    fn notify(&mut self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SetView { center: LatLng, zoom: u8 },
    FitBounds { bounds: Bounds, padding: Padding },
    AddOverlay { handle: OverlayHandle, route_id: RouteId },
    RemoveOverlay { handle: OverlayHandle },
    OpenPopup { at: LatLng, text: String },
    Notify { text: String },
}

/// Surface that records every command it receives. Used headless by the
/// preview binary and as the map double in tests.
#[derive(Debug, Default)]
pub struct CommandLog {
    commands: Vec<Command>,
    next_handle: u64,
    attached: Vec<(OverlayHandle, OverlaySpec)>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Overlays currently attached, in attachment order.
    pub fn overlays(&self) -> &[(OverlayHandle, OverlaySpec)] {
        &self.attached
    }

    pub fn fit_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::FitBounds { .. }))
            .count()
    }
}

impl MapSurface for CommandLog {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        debug!(?center, zoom, "set_view");
        self.commands.push(Command::SetView { center, zoom });
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: Padding) {
        debug!(?bounds, "fit_bounds");
        self.commands.push(Command::FitBounds { bounds, padding });
    }

    fn add_overlay(&mut self, spec: &OverlaySpec) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.attached.push((handle, spec.clone()));
        self.commands.push(Command::AddOverlay {
            handle,
            route_id: spec.route_id,
        });
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.attached.retain(|(h, _)| *h != handle);
        self.commands.push(Command::RemoveOverlay { handle });
    }

    fn open_popup(&mut self, at: LatLng, text: &str) {
        self.commands.push(Command::OpenPopup {
            at,
            text: text.to_string(),
        });
    }

    fn notify(&mut self, text: &str) {
        self.commands.push(Command::Notify {
            text: text.to_string(),
        });
    }
}
