//! Declarative layers for one frame of the map.

use serde::Serialize;

use crate::highlight::emphasis;
use crate::route::{LatLng, RouteId, RouteRecord};
use crate::surface::OverlaySpec;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

pub const START_FILL: &str = "#27ae60";
pub const END_FILL: &str = "#c0392b";
pub const USER_FILL: &str = "#2980b9";
pub const MARKER_STROKE: &str = "white";
pub const ENDPOINT_RADIUS: f64 = 6.0;
pub const USER_RADIUS: f64 = 8.0;
pub const USER_POPUP: &str = "Tu ubicación actual";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Start,
    End,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum Layer {
    Polyline {
        route_id: RouteId,
        points: Vec<LatLng>,
        color: String,
        weight: f64,
        opacity: f64,
        line_cap: LineCap,
    },
    CircleMarker {
        route_id: Option<RouteId>,
        role: MarkerRole,
        center: LatLng,
        radius: f64,
        color: String,
        fill_color: String,
        fill_opacity: f64,
        weight: Option<f64>,
        popup: String,
    },
    Direction(OverlaySpec),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url: &'static str,
    pub attribution: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tiles: TileLayer,
    pub layers: Vec<Layer>,
}

impl Frame {
    pub fn polylines(&self) -> impl Iterator<Item = &Layer> {
        self.layers
            .iter()
            .filter(|l| matches!(l, Layer::Polyline { .. }))
    }

    pub fn directions(&self) -> impl Iterator<Item = &OverlaySpec> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Direction(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn markers(&self, role: MarkerRole) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().filter(move |l| {
            matches!(l, Layer::CircleMarker { role: r, .. } if *r == role)
        })
    }
}

/// Projects the current state into layers. Holds no memory of earlier frames.
pub fn render<'a>(
    visible: &[&RouteRecord],
    active: Option<RouteId>,
    user_position: Option<LatLng>,
    overlays: impl IntoIterator<Item = &'a OverlaySpec>,
) -> Frame {
    let mut layers = Vec::with_capacity(visible.len() * 4 + 1);

    for route in visible {
        let stroke = emphasis(route.id, active);
        layers.push(Layer::Polyline {
            route_id: route.id,
            points: route.geometry.clone(),
            color: route.color.clone(),
            weight: stroke.weight,
            opacity: stroke.opacity,
            line_cap: LineCap::Round,
        });
        if let Some(start) = route.start() {
            layers.push(endpoint(
                route,
                MarkerRole::Start,
                start,
                START_FILL,
                format!("Inicio: {}\n💵 {}", route.name, route.fare),
            ));
        }
        if let Some(end) = route.end() {
            layers.push(endpoint(
                route,
                MarkerRole::End,
                end,
                END_FILL,
                format!("Fin: {}", route.name),
            ));
        }
    }

    layers.extend(overlays.into_iter().cloned().map(Layer::Direction));

    if let Some(center) = user_position {
        layers.push(Layer::CircleMarker {
            route_id: None,
            role: MarkerRole::User,
            center,
            radius: USER_RADIUS,
            color: MARKER_STROKE.to_string(),
            fill_color: USER_FILL.to_string(),
            fill_opacity: 1.0,
            weight: Some(3.0),
            popup: USER_POPUP.to_string(),
        });
    }

    Frame {
        tiles: TileLayer {
            url: TILE_URL,
            attribution: TILE_ATTRIBUTION,
        },
        layers,
    }
}

fn endpoint(
    route: &RouteRecord,
    role: MarkerRole,
    center: LatLng,
    fill: &str,
    popup: String,
) -> Layer {
    Layer::CircleMarker {
        route_id: Some(route.id),
        role,
        center,
        radius: ENDPOINT_RADIUS,
        color: MARKER_STROKE.to_string(),
        fill_color: fill.to_string(),
        fill_opacity: 1.0,
        weight: None,
        popup,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::highlight::{BASE_WEIGHT, HIGHLIGHT_WEIGHT};
    use crate::overlay::overlay_spec;
    use crate::test_support::record;

    #[test]
    fn one_polyline_and_two_endpoints_per_route() {
        let a = record(1, "red", 3);
        let b = record(2, "blue", 2);
        let specs = vec![overlay_spec(&a), overlay_spec(&b)];

        let frame = render(&[&a, &b], None, None, &specs);

        assert_eq!(frame.polylines().count(), 2);
        assert_eq!(frame.markers(MarkerRole::Start).count(), 2);
        assert_eq!(frame.markers(MarkerRole::End).count(), 2);
        assert_eq!(frame.directions().count(), 2);
        assert_eq!(frame.markers(MarkerRole::User).count(), 0);
    }

    #[test]
    fn endpoints_sit_on_first_and_last_point_with_name() {
        let a = record(1, "red", 3);
        let frame = render(&[&a], None, None, []);

        match frame.markers(MarkerRole::End).next() {
            Some(Layer::CircleMarker { center, fill_color, popup, .. }) => {
                assert_eq!(Some(*center), a.end());
                assert_eq!(fill_color, END_FILL);
                assert!(popup.contains(&a.name));
            }
            other => panic!("unexpected layer {:?}", other),
        }
        match frame.markers(MarkerRole::Start).next() {
            Some(Layer::CircleMarker { center, popup, .. }) => {
                assert_eq!(Some(*center), a.start());
                assert!(popup.contains(&a.fare));
            }
            other => panic!("unexpected layer {:?}", other),
        };
    }

    #[test]
    fn active_route_is_emphasized() {
        let a = record(1, "red", 3);
        let b = record(2, "blue", 2);
        let frame = render(&[&a, &b], Some(RouteId(2)), None, []);

        let weights: Vec<f64> = frame
            .polylines()
            .map(|l| match l {
                Layer::Polyline { weight, .. } => *weight,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(weights, vec![BASE_WEIGHT, HIGHLIGHT_WEIGHT]);
    }

    #[test]
    fn route_without_points_gets_no_endpoints() {
        let empty = record(1, "red", 0);
        let frame = render(&[&empty], None, None, []);

        assert_eq!(frame.polylines().count(), 1);
        assert_eq!(frame.markers(MarkerRole::Start).count(), 0);
        assert_eq!(frame.markers(MarkerRole::End).count(), 0);
    }

    #[test]
    fn user_marker_only_with_position() {
        let frame = render(&[], None, Some(LatLng::new(26.09, -98.28)), []);
        assert_eq!(frame.markers(MarkerRole::User).count(), 1);
        assert_eq!(frame.layers.len(), 1);
    }
}
