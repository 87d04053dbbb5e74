use peceras::config::Config;
use peceras::server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let app = server::router(config.routes_csv.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("could not bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!(
        "Server is running on http://localhost:{} serving {}",
        config.port,
        config.routes_csv.display()
    );
    if let Err(e) = axum::serve(listener, app).await {
        error!("server stopped: {}", e);
    }
}
