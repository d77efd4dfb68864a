use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

use corebe_server::audit::Auditor;
use corebe_server::config::{AppConfig, CorsConfig};
use corebe_server::database;
use corebe_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    info!("Database schema synced");

    let auditor = Auditor::new(
        config
            .audit
            .as_ref()
            .and_then(|audit| audit.principal.clone()),
    );

    let cors = cors_layer(&config.server.cors)?;
    let state = AppState { db, auditor };
    let app = corebe_server::build_router(state).layer(cors);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .allow_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(origins))
}
