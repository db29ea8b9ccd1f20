// Outbound integrations
// Slack incoming webhook, Tableau REST API, shared HTTP helper.

pub mod error;
pub mod outbound;
pub mod slack_service;
pub mod tableau_service;

pub use error::{UpstreamCall, UpstreamError, UpstreamResponse};
pub use outbound::OutboundClient;
pub use slack_service::SlackService;
pub use tableau_service::{TableauService, TableauSession};
