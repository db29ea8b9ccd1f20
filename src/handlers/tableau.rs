//! Tableau webhook subscription management.
//!
//! Request bodies are validated before any call to Tableau is made. Errors
//! returned by Tableau are relayed as-is.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::response::{
    CreateWebhookResponse, DeleteWebhookResponse, ListWebhooksResponse, STATUS_SUCCESS,
};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorCode, Result};
use crate::models::tableau::{EVENTS_DOC_URL, is_supported_event};

#[derive(Debug, Deserialize)]
pub struct CreateWebhookRequest {
    pub name: Option<String>,
    pub event: Option<String>,
    pub destination_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteWebhookRequest {
    pub webhook_id: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, PartialEq, Eq, Validate)]
pub struct NewSubscription {
    pub name: String,
    pub event: String,
    #[validate(url)]
    pub destination_url: String,
}

impl CreateWebhookRequest {
    pub fn validate(self) -> Result<NewSubscription> {
        let name = present(self.name).ok_or_else(|| {
            ApiError::missing_field("name", "Webhook name is required")
        })?;
        let event = present(self.event).ok_or_else(|| {
            ApiError::missing_field("event", "Event type is required")
        })?;
        if !is_supported_event(&event) {
            return Err(ApiError::Validation {
                code: ErrorCode::UnsupportedEvent,
                field: "event".to_string(),
                message: format!(
                    "Invalid event type: {}. Please refer to the valid event types: {}",
                    event, EVENTS_DOC_URL
                ),
            });
        }
        let destination_url = present(self.destination_url).ok_or_else(|| {
            ApiError::missing_field("destination_url", "Destination URL is required")
        })?;

        let subscription = NewSubscription {
            name,
            event,
            destination_url,
        };
        subscription.validate().map_err(|_| {
            ApiError::validation_field(
                "destination_url",
                format!(
                    "Destination URL is not a valid URL: {}",
                    subscription.destination_url
                ),
            )
        })?;

        Ok(subscription)
    }
}

impl DeleteWebhookRequest {
    pub fn validate(self) -> Result<String> {
        present(self.webhook_id)
            .ok_or_else(|| ApiError::missing_field("webhook_id", "Missing required parameter: webhook_id"))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Register a webhook subscription on Tableau Server
/// POST /create_tableau_webhook
pub async fn create_webhook(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateWebhookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateWebhookResponse>)> {
    let Json(request) = payload?;
    let subscription = request.validate()?;
    info!(
        name = %subscription.name,
        event = %subscription.event,
        destination_url = %subscription.destination_url,
        "Creating Tableau webhook"
    );

    let webhook = state
        .tableau
        .create_webhook(
            &subscription.name,
            &subscription.event,
            &subscription.destination_url,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateWebhookResponse {
            status: STATUS_SUCCESS.to_string(),
            webhook,
        }),
    ))
}

/// List webhook subscriptions on Tableau Server
/// GET /list_tableau_webhooks
pub async fn list_webhooks(State(state): State<AppState>) -> Result<Json<ListWebhooksResponse>> {
    let webhooks = state.tableau.list_webhooks().await?;

    Ok(Json(ListWebhooksResponse {
        status: STATUS_SUCCESS.to_string(),
        webhooks,
    }))
}

/// Delete a webhook subscription on Tableau Server
/// POST /delete_tableau_webhook
pub async fn delete_webhook(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteWebhookRequest>, JsonRejection>,
) -> Result<Json<DeleteWebhookResponse>> {
    let Json(request) = payload?;
    let webhook_id = request.validate()?;
    info!(webhook_id = %webhook_id, "Deleting Tableau webhook");

    state.tableau.delete_webhook(&webhook_id).await?;

    Ok(Json(DeleteWebhookResponse {
        status: STATUS_SUCCESS.to_string(),
        webhook_id,
    }))
}
