use geo::{BoundingRect, Coord, LineString};

use crate::route::LatLng;
use crate::surface::{Bounds, MapSurface, Padding};

pub const FIT_PADDING: Padding = Padding { x: 50, y: 50 };

/// Smallest box covering every point, or `None` for an empty path.
pub fn bounds_of(points: &[LatLng]) -> Option<Bounds> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect();

    line.bounding_rect().map(|rect| Bounds {
        south_west: LatLng::new(rect.min().y, rect.min().x),
        north_east: LatLng::new(rect.max().y, rect.max().x),
    })
}

#[derive(Debug, Default)]
pub struct CameraController;

impl CameraController {
    pub fn new() -> Self {
        Self
    }

    /// Fits the viewport to `geometry` with a fixed margin. Returns whether a
    /// command was issued; nothing happens before the map is attached or for
    /// an empty path.
    pub fn focus<S: MapSurface>(&self, surface: Option<&mut S>, geometry: &[LatLng]) -> bool {
        let Some(surface) = surface else {
            return false;
        };
        match bounds_of(geometry) {
            Some(bounds) => {
                surface.fit_bounds(bounds, FIT_PADDING);
                true
            }
            None => false,
        }
    }

    pub fn center<S: MapSurface>(&self, surface: Option<&mut S>, at: LatLng, zoom: u8) -> bool {
        match surface {
            Some(surface) => {
                surface.set_view(at, zoom);
                true
            }
            None => false,
        }
    }
}
