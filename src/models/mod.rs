// Data models and DTOs
// Inbound Tableau events, outbound Slack messages, Tableau REST payloads.

pub mod event;
pub mod slack;
pub mod tableau;

pub use event::EventSummary;
pub use slack::{SlackAttachment, SlackField, SlackMessage};
pub use tableau::WebhookSummary;
