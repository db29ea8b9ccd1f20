//! Tableau REST API payloads (JSON representation).

use serde::{Deserialize, Serialize};

use crate::config::TableauAuthMethod;

/// Body of `POST /api/{version}/auth/signin`.
#[derive(Serialize)]
pub struct SignInRequest<'a> {
    pub credentials: SignInCredentials<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInCredentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_access_token_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_access_token_secret: Option<&'a str>,
    pub site: SiteRef<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRef<'a> {
    pub content_url: &'a str,
}

impl<'a> SignInRequest<'a> {
    pub fn new(method: TableauAuthMethod, username: &'a str, secret: &'a str, site: &'a str) -> Self {
        let site = SiteRef { content_url: site };
        let credentials = match method {
            TableauAuthMethod::PersonalAccessToken => SignInCredentials {
                name: None,
                password: None,
                personal_access_token_name: Some(username),
                personal_access_token_secret: Some(secret),
                site,
            },
            TableauAuthMethod::Password => SignInCredentials {
                name: Some(username),
                password: Some(secret),
                personal_access_token_name: None,
                personal_access_token_secret: None,
                site,
            },
        };
        Self { credentials }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub credentials: Option<SignInResponseCredentials>,
}

#[derive(Debug, Deserialize)]
pub struct SignInResponseCredentials {
    pub token: Option<String>,
    pub site: Option<SiteInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub id: Option<String>,
    pub content_url: Option<String>,
}

/// Body of `POST /api/{version}/sites/{site}/webhooks`.
#[derive(Debug, Serialize)]
pub struct CreateWebhookBody<'a> {
    pub webhook: NewWebhook<'a>,
}

#[derive(Debug, Serialize)]
pub struct NewWebhook<'a> {
    pub name: &'a str,
    pub event: &'a str,
    #[serde(rename = "webhook-destination")]
    pub destination: NewWebhookDestination<'a>,
}

#[derive(Debug, Serialize)]
pub struct NewWebhookDestination<'a> {
    #[serde(rename = "webhook-destination-http")]
    pub http: NewWebhookDestinationHttp<'a>,
}

#[derive(Debug, Serialize)]
pub struct NewWebhookDestinationHttp<'a> {
    pub method: &'a str,
    pub url: &'a str,
}

impl<'a> CreateWebhookBody<'a> {
    pub fn new(name: &'a str, event: &'a str, destination_url: &'a str) -> Self {
        Self {
            webhook: NewWebhook {
                name,
                event,
                destination: NewWebhookDestination {
                    http: NewWebhookDestinationHttp {
                        method: "POST",
                        url: destination_url,
                    },
                },
            },
        }
    }
}

/// `{"webhook": {...}}` as returned by the create call.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub webhook: Option<TableauWebhook>,
}

/// `{"webhooks": {"webhook": [...]}}` as returned by the list call.
#[derive(Debug, Deserialize)]
pub struct WebhookListEnvelope {
    pub webhooks: Option<WebhookList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookList {
    #[serde(default)]
    pub webhook: Vec<TableauWebhook>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableauWebhook {
    pub id: Option<String>,
    pub name: Option<String>,
    pub event: Option<String>,
    pub is_enabled: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(rename = "webhook-destination")]
    pub destination: Option<WebhookDestination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookDestination {
    #[serde(rename = "webhook-destination-http")]
    pub http: Option<WebhookDestinationHttp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookDestinationHttp {
    pub method: Option<String>,
    pub url: Option<String>,
}

/// Flattened subscription returned to our callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub event: Option<String>,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<TableauWebhook> for WebhookSummary {
    fn from(webhook: TableauWebhook) -> Self {
        Self {
            url: webhook
                .destination
                .and_then(|d| d.http)
                .and_then(|http| http.url),
            id: webhook.id,
            name: webhook.name,
            event: webhook.event,
            is_enabled: webhook.is_enabled,
            created_at: webhook.created_at,
            updated_at: webhook.updated_at,
        }
    }
}

/// `{"error": {"code", "summary", "detail"}}`
#[derive(Debug, Deserialize)]
pub struct TableauErrorEnvelope {
    pub error: Option<TableauErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct TableauErrorBody {
    pub code: Option<serde_json::Value>,
    pub summary: Option<String>,
    pub detail: Option<String>,
}

/// Render a Tableau error body as `code: summary - detail`.
pub fn describe_error(body: &str) -> String {
    match serde_json::from_str::<TableauErrorEnvelope>(body) {
        Ok(TableauErrorEnvelope { error: Some(error) }) => {
            let code = match error.code {
                Some(serde_json::Value::String(code)) => code,
                Some(other) => other.to_string(),
                None => "unknown code".to_string(),
            };
            format!(
                "{}: {} - {}",
                code,
                error.summary.as_deref().unwrap_or("unknown summary"),
                error.detail.as_deref().unwrap_or("unknown detail")
            )
        }
        _ => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        }
    }
}

/// Tableau webhook events accepted by the create endpoint.
/// See <https://help.tableau.com/current/developer/webhooks/en-us/docs/webhooks-events-payload.html>.
pub const SUPPORTED_EVENTS: &[&str] = &[
    "AdminPromoted",
    "AdminDemoted",
    "DatasourceUpdated",
    "DatasourceCreated",
    "DatasourceDeleted",
    "DatasourceRefreshStarted",
    "DatasourceRefreshSucceeded",
    "DatasourceRefreshFailed",
    "LabelCreated",
    "LabelUpdated",
    "LabelDeleted",
    "SiteCreated",
    "SiteUpdated",
    "SiteDeleted",
    "UserDeleted",
    "ViewDeleted",
    "WorkbookUpdated",
    "WorkbookCreated",
    "WorkbookDeleted",
    "WorkbookRefreshStarted",
    "WorkbookRefreshSucceeded",
    "WorkbookRefreshFailed",
];

pub const EVENTS_DOC_URL: &str =
    "https://help.tableau.com/current/developer/webhooks/en-us/docs/webhooks-events-payload.html";

pub fn is_supported_event(event: &str) -> bool {
    SUPPORTED_EVENTS.contains(&event)
}
