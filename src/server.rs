use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::error::SourceError;
use crate::route::RawRoute;

pub const LIVENESS: &str = "Servidor de Peceras activo 🚌";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub routes_csv: Arc<PathBuf>,
}

pub fn router(routes_csv: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(liveness))
        .route("/rutas", get(get_routes))
        .layer(cors)
        .with_state(AppState {
            routes_csv: Arc::new(routes_csv),
        })
}

async fn liveness() -> &'static str {
    LIVENESS
}

// Axum handler for /rutas, re-reads the table on every request
async fn get_routes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RawRoute>>, (StatusCode, Json<ErrorResponse>)> {
    match load_routes(&state.routes_csv) {
        Ok(routes) => {
            info!("serving {} routes", routes.len());
            Ok(Json(routes))
        }
        Err(e) => {
            error!("{}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error en el servidor".to_string(),
                }),
            ))
        }
    }
}

/// Reads `id,nombre,color,geojson,descripcion,costo,horario` rows. Empty
/// optional cells come back as `None`.
pub fn load_routes(path: &Path) -> Result<Vec<RawRoute>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_routes(file).map_err(|source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_routes<R: Read>(reader: R) -> Result<Vec<RawRoute>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let mut routes = Vec::new();
    for result in rdr.deserialize() {
        let route: RawRoute = result?;
        routes.push(route);
    }
    Ok(routes)
}
