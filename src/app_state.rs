//! Application state shared across all handlers.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{OutboundClient, SlackService, TableauService};

/// Immutable per-process state. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Configuration read once at startup
    pub config: Arc<Config>,
    /// Slack incoming-webhook delivery
    pub slack: SlackService,
    /// Tableau REST client
    pub tableau: TableauService,
    /// Prometheus renderer, present when the global recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Config, metrics: Option<PrometheusHandle>) -> Result<Self> {
        let outbound = OutboundClient::new(config.outbound_timeout)
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            slack: SlackService::new(outbound.clone(), config.slack.clone()),
            tableau: TableauService::new(outbound, config.tableau.clone()),
            config: Arc::new(config),
            metrics,
        })
    }
}
