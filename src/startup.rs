//! Application startup and initialization logic.

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, LogFormat};

const DEFAULT_LOG_FILTER: &str = "tableau_slack_relay=info,tower_http=info";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Build the AppState for a running server, including the Prometheus recorder.
pub fn initialize_app(config: Config) -> Result<AppState> {
    let metrics_handle = install_metrics_recorder();

    info!(
        slack_channel = %config.slack.channel,
        tableau_server = %config.tableau.server,
        tableau_site = %config.tableau.site_id,
        tableau_api_version = %config.tableau.version,
        outbound_timeout_secs = config.outbound_timeout.as_secs(),
        "Relay configuration loaded"
    );

    let app_state = AppState::new(config, metrics_handle)?;
    info!("AppState created");

    Ok(app_state)
}

/// The recorder is process-global; failure leaves `/metrics` disabled.
fn install_metrics_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics initialized");
            Some(handle)
        }
        Err(e) => {
            warn!("Prometheus recorder not installed: {}. /metrics is disabled.", e);
            None
        }
    }
}

/// Wait for SIGTERM or SIGINT signal for graceful shutdown
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
