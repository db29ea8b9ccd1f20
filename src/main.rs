use std::net::SocketAddr;

use anyhow::Result;
use tracing::info;

use tableau_slack_relay::{Config, build_router, startup};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (.env first, then the process environment)
    let config = Config::from_env()?;

    startup::init_tracing(config.log_format);

    let addr = SocketAddr::new(config.host, config.port);
    let app_state = startup::initialize_app(config)?;
    let app = build_router(app_state);

    info!("Starting Tableau Slack relay on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(startup::shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
