use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::route::RouteId;

/// Failure retrieving the route table from the backend. Terminal for the
/// session: the store simply stays empty.
#[derive(Error, Debug)]
pub enum DataFetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend answered {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("could not decode route list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A single record whose geometry cannot be drawn. The record is dropped,
/// the rest of the load proceeds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("route {id}: geometry is not valid GeoJSON: {reason}")]
    Parse { id: RouteId, reason: String },
    #[error("route {id}: unsupported geometry type {kind}")]
    UnsupportedType { id: RouteId, kind: String },
    #[error("route {id}: position {index} has {len} components")]
    BadPosition { id: RouteId, index: usize, len: usize },
    #[error("route {id}: position {index} is out of range ({lng}, {lat})")]
    OutOfRange {
        id: RouteId,
        index: usize,
        lng: f64,
        lat: f64,
    },
    #[error("route {id}: geometry has {points} point(s), at least 2 are required")]
    TooShort { id: RouteId, points: usize },
}

impl GeometryError {
    pub fn route_id(&self) -> RouteId {
        match self {
            GeometryError::Parse { id, .. }
            | GeometryError::UnsupportedType { id, .. }
            | GeometryError::BadPosition { id, .. }
            | GeometryError::OutOfRange { id, .. }
            | GeometryError::TooShort { id, .. } => *id,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("no location fix within {0:?}")]
    Timeout(Duration),
    #[error("position unavailable")]
    PositionUnavailable,
}

impl LocationError {
    /// Text shown to the user, whatever the cause.
    pub fn user_message(&self) -> &'static str {
        "No pudimos encontrar tu ubicación."
    }
}

/// Errors reading the route table the backend serves.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed route table '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a record was left out of a load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("route {0}: id already loaded")]
    DuplicateId(RouteId),
}

impl LoadError {
    pub fn route_id(&self) -> RouteId {
        match self {
            LoadError::Geometry(e) => e.route_id(),
            LoadError::DuplicateId(id) => *id,
        }
    }
}
