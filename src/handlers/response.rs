//! Success bodies returned by the relay endpoints.

use serde::{Deserialize, Serialize};

use crate::models::WebhookSummary;

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Serialize, Deserialize)]
pub struct EventAcceptedResponse {
    pub status: String,
    pub event_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWebhookResponse {
    pub status: String,
    pub webhook: WebhookSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListWebhooksResponse {
    pub status: String,
    pub webhooks: Vec<WebhookSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteWebhookResponse {
    pub status: String,
    pub webhook_id: String,
}
