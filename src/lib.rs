//! Interactive bus-route map engine for Reynosa's *peceras*.
//!
//! Turns the backend's route table into map state: normalized geometry,
//! per-route visibility, hover emphasis, search, camera moves, direction
//! arrows and the user's location, projected into declarative layers.

pub mod app;
pub mod camera;
pub mod client;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod highlight;
pub mod overlay;
pub mod render;
pub mod route;
pub mod search;
pub mod server;
pub mod store;
pub mod surface;
