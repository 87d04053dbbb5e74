use reqwest::Client;
use tracing::{error, info};

use crate::app::MapApp;
use crate::error::DataFetchError;
use crate::route::RawRoute;
use crate::store::LoadReport;
use crate::surface::MapSurface;

// Fetch the full route table from the backend
pub async fn fetch_routes(client: &Client, base_url: &str) -> Result<Vec<RawRoute>, DataFetchError> {
    let url = format!("{}/rutas", base_url.trim_end_matches('/'));

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| DataFetchError::Request {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DataFetchError::Status {
            url,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| DataFetchError::Request {
            url: url.clone(),
            source,
        })?;

    let routes: Vec<RawRoute> = serde_json::from_slice(&body)?;
    info!("fetched {} routes from {}", routes.len(), url);
    Ok(routes)
}

/// Startup fetch: one attempt, then a single atomic load. On failure the
/// store stays empty for the rest of the session.
pub async fn bootstrap<S: MapSurface>(
    app: &mut MapApp<S>,
    client: &Client,
    base_url: &str,
) -> Result<LoadReport, DataFetchError> {
    match fetch_routes(client, base_url).await {
        Ok(raw) => Ok(app.load_raw(raw)),
        Err(e) => {
            error!("could not load routes: {}", e);
            Err(e)
        }
    }
}
