//! Inbound Tableau event receiver.

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde_json::Value;
use tracing::info;

use super::response::{EventAcceptedResponse, STATUS_SUCCESS};
use crate::app_state::AppState;
use crate::error::Result;
use crate::models::EventSummary;

/// Forward a Tableau event to Slack
/// POST /webhook
pub async fn receive_event(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<EventAcceptedResponse>> {
    let Json(payload) = payload?;
    info!(payload = %payload, "Received Tableau event");

    let summary = EventSummary::from_payload(&payload);
    state.slack.notify(&summary).await?;

    Ok(Json(EventAcceptedResponse {
        status: STATUS_SUCCESS.to_string(),
        event_type: summary.event_type,
    }))
}
