use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LocationError;
use crate::route::LatLng;

pub const LOCATE_ZOOM: u8 = 16;
pub const FOUND_POPUP: &str = "📍 Estás aquí";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// The device side of a location request. `request_fix` only starts the
/// query; the answer comes back later through
/// [`GeolocationTracker::complete`].
pub trait LocationSource {
    fn request_fix(&mut self, options: &LocationOptions);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fix {
    pub position: LatLng,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    Idle,
    Requesting,
    Found(Fix),
    Failed(LocationError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationUpdate {
    Found(Fix),
    Failed(LocationError),
    /// A completion arrived with no request in flight.
    Ignored,
}

#[derive(Debug)]
pub struct GeolocationTracker {
    state: LocationState,
    user_position: Option<LatLng>,
    options: LocationOptions,
}

impl GeolocationTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: LocationState::Idle,
            user_position: None,
            options: LocationOptions {
                high_accuracy: true,
                timeout,
            },
        }
    }

    /// Starts a location query unless one is already pending. Returns
    /// whether the device was actually asked.
    pub fn request<L: LocationSource>(&mut self, source: &mut L) -> bool {
        if self.state == LocationState::Requesting {
            debug!("location request already in flight");
            return false;
        }
        self.state = LocationState::Requesting;
        source.request_fix(&self.options);
        true
    }

    pub fn complete(&mut self, result: Result<LatLng, LocationError>) -> LocationUpdate {
        if self.state != LocationState::Requesting {
            return LocationUpdate::Ignored;
        }
        match result {
            Ok(position) => {
                let fix = Fix {
                    position,
                    at: Utc::now(),
                };
                info!(lat = position.lat, lng = position.lng, "location found");
                self.user_position = Some(position);
                self.state = LocationState::Found(fix);
                LocationUpdate::Found(fix)
            }
            Err(e) => {
                warn!("location failed: {}", e);
                self.state = LocationState::Failed(e.clone());
                LocationUpdate::Failed(e)
            }
        }
    }

    pub fn state(&self) -> &LocationState {
        &self.state
    }

    pub fn user_position(&self) -> Option<LatLng> {
        self.user_position
    }

    pub fn options(&self) -> &LocationOptions {
        &self.options
    }
}
