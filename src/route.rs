//! Route records as they arrive from the backend and as the map consumes them.

use std::fmt;

use geojson::{GeoJson, Value};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

pub const DEFAULT_FARE: &str = "$12.00";
pub const DEFAULT_SCHEDULE: &str = "5am-10pm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub i64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in (latitude, longitude) order, the order the renderer expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Row of `GET /rutas`. `geojson` holds a serialized geometry whose
/// positions are `[longitude, latitude]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoute {
    pub id: i64,
    pub nombre: String,
    pub color: String,
    pub geojson: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horario: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    pub id: RouteId,
    pub name: String,
    pub color: String,
    pub geometry: Vec<LatLng>,
    pub description: Option<String>,
    pub fare: String,
    pub schedule: String,
}

impl RouteRecord {
    /// First point; `None` only for a record built by hand with no geometry.
    pub fn start(&self) -> Option<LatLng> {
        self.geometry.first().copied()
    }

    pub fn end(&self) -> Option<LatLng> {
        self.geometry.last().copied()
    }
}

impl TryFrom<RawRoute> for RouteRecord {
    type Error = GeometryError;

    fn try_from(raw: RawRoute) -> Result<Self, Self::Error> {
        normalize(raw)
    }
}

/// Turns a wire record into a drawable one: geometry flattened to a single
/// sequence and swapped to (lat, lng), missing fare/schedule defaulted.
pub fn normalize(raw: RawRoute) -> Result<RouteRecord, GeometryError> {
    let id = RouteId(raw.id);
    let geometry = parse_geometry(id, &raw.geojson)?;

    Ok(RouteRecord {
        id,
        name: raw.nombre,
        color: raw.color,
        geometry,
        description: raw.descripcion,
        fare: or_placeholder(raw.costo, DEFAULT_FARE),
        schedule: or_placeholder(raw.horario, DEFAULT_SCHEDULE),
    })
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}

fn parse_geometry(id: RouteId, encoded: &str) -> Result<Vec<LatLng>, GeometryError> {
    let parsed: GeoJson = encoded.parse().map_err(|e: geojson::Error| GeometryError::Parse {
        id,
        reason: e.to_string(),
    })?;

    let geometry = match parsed {
        GeoJson::Geometry(g) => g,
        GeoJson::Feature(f) => f.geometry.ok_or_else(|| GeometryError::Parse {
            id,
            reason: "feature has no geometry".to_string(),
        })?,
        GeoJson::FeatureCollection(_) => {
            return Err(GeometryError::UnsupportedType {
                id,
                kind: "FeatureCollection".to_string(),
            })
        }
    };

    // Multi-segment lines are joined end to end in their stored order.
    let positions: Vec<Vec<f64>> = match geometry.value {
        Value::LineString(line) => line,
        Value::MultiLineString(lines) => lines.into_iter().flatten().collect(),
        other => {
            return Err(GeometryError::UnsupportedType {
                id,
                kind: type_name(&other).to_string(),
            })
        }
    };

    let mut points = Vec::with_capacity(positions.len());
    for (index, position) in positions.iter().enumerate() {
        if position.len() < 2 {
            return Err(GeometryError::BadPosition {
                id,
                index,
                len: position.len(),
            });
        }
        let (lng, lat) = (position[0], position[1]);
        if !lng.is_finite()
            || !lat.is_finite()
            || !(-180.0..=180.0).contains(&lng)
            || !(-90.0..=90.0).contains(&lat)
        {
            return Err(GeometryError::OutOfRange { id, index, lng, lat });
        }
        points.push(LatLng::new(lat, lng));
    }

    if points.len() < 2 {
        return Err(GeometryError::TooShort {
            id,
            points: points.len(),
        });
    }

    Ok(points)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
