pub mod health;
pub mod response;
pub mod tableau;
pub mod webhook;

pub use response::{
    CreateWebhookResponse, DeleteWebhookResponse, EventAcceptedResponse, ListWebhooksResponse,
};
pub use tableau::{CreateWebhookRequest, DeleteWebhookRequest};
