use serde::{Deserialize, Serialize};

use super::event::EventSummary;

/// Slack incoming-webhook message with a single colored attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub channel: String,
    pub text: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackAttachment {
    pub fallback: String,
    pub color: String,
    pub pretext: String,
    pub fields: Vec<SlackField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl SlackMessage {
    pub fn for_event(summary: &EventSummary, channel: &str, color: &str) -> Self {
        Self {
            channel: channel.to_string(),
            text: format!("Tableau event: {}", summary.headline()),
            attachments: vec![SlackAttachment {
                fallback: summary.headline(),
                color: color.to_string(),
                pretext: format!("{}:", summary.event_type),
                fields: vec![SlackField {
                    title: summary.resource_name.clone(),
                    value: summary.text.clone(),
                    short: false,
                }],
            }],
        }
    }
}
