//! Fetches the route table, loads it into a headless map and prints what
//! the sidebar and the map would show.

use clap::Parser;
use peceras::app::MapApp;
use peceras::client;
use peceras::config::Config;
use peceras::route::RouteId;
use peceras::surface::CommandLog;
use serde_json::json;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Print the route list and map frame as JSON")]
struct Args {
    /// Search text applied to the route list
    query: Option<String>,
    /// Route id to hide; repeatable
    #[arg(long = "hide")]
    hide: Vec<i64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();

    let mut app = MapApp::new(config.location_timeout);
    app.attach(CommandLog::new());

    let http = reqwest::Client::new();
    // A failed fetch leaves the map empty; the preview still prints it.
    let _ = client::bootstrap(&mut app, &http, &config.api_url).await;

    for id in args.hide.into_iter().map(RouteId) {
        if !app.set_visible(id, false) {
            warn!("route {} is not loaded", id);
        }
    }
    app.set_query(args.query.unwrap_or_default());

    let commands = app
        .surface()
        .map(|s| s.commands().to_vec())
        .unwrap_or_default();
    let output = json!({
        "rows": app.list_rows(),
        "frame": app.frame(),
        "commands": commands,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => warn!("could not serialize preview: {}", e),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_query_and_repeated_hide() {
        let args = Args::try_parse_from(["peceras-preview", "juarez", "--hide", "2", "--hide", "4"]).unwrap();
        assert_eq!(args.query.as_deref(), Some("juarez"));
        assert_eq!(args.hide, vec![2, 4]);
    }

    #[test]
    fn rejects_non_numeric_hide() {
        assert!(Args::try_parse_from(["peceras-preview", "--hide", "abc"]).is_err());
    }

    #[test]
    fn everything_optional() {
        let args = Args::try_parse_from(["peceras-preview"]).unwrap();
        assert_eq!(args.query, None);
        assert!(args.hide.is_empty());
    }
}
