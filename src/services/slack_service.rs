use metrics::counter;
use tracing::{error, info};

use super::error::{UpstreamCall, UpstreamError};
use super::outbound::{read_body, OutboundClient};
use crate::config::SlackConfig;
use crate::models::{EventSummary, SlackMessage};

const CALL: UpstreamCall = UpstreamCall::SlackPost;

/// Posts Tableau event notifications to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackService {
    outbound: OutboundClient,
    config: SlackConfig,
}

impl SlackService {
    pub fn new(outbound: OutboundClient, config: SlackConfig) -> Self {
        Self { outbound, config }
    }

    /// Message addressed to the configured channel in the configured color.
    pub fn build_message(&self, summary: &EventSummary) -> SlackMessage {
        SlackMessage::for_event(summary, &self.config.channel, &self.config.color)
    }

    /// Format and deliver one notification. Delivery is attempted once.
    pub async fn notify(&self, summary: &EventSummary) -> Result<SlackMessage, UpstreamError> {
        let message = self.build_message(summary);
        self.post_message(&message).await?;
        Ok(message)
    }

    pub async fn post_message(&self, message: &SlackMessage) -> Result<(), UpstreamError> {
        let request = self
            .outbound
            .http()
            .post(self.config.webhook_url.clone())
            .json(message);

        let result = self.deliver(request).await;
        counter!(
            "slack_notifications_total",
            "result" => if result.is_ok() { "success" } else { "failure" }
        )
        .increment(1);
        result
    }

    async fn deliver(&self, request: reqwest::RequestBuilder) -> Result<(), UpstreamError> {
        let response = self.outbound.send(CALL, request).await?;
        let (status, body) = read_body(CALL, response).await?;

        if status.is_success() {
            info!(channel = %self.config.channel, "Alert posted to Slack successfully");
            return Ok(());
        }

        error!(
            channel = %self.config.channel,
            status = %status,
            body = %body.body,
            "Failed to post data to Slack"
        );
        let message = body.body.trim().to_string();
        Err(UpstreamError::rejected(CALL, status, message, body))
    }
}
