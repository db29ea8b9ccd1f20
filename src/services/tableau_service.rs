//! Tableau REST client for webhook subscription management.
//!
//! Every public operation signs in first and uses the resulting token for
//! exactly one call. Tokens are never cached.

use reqwest::{header, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{error, info};

use super::error::{UpstreamCall, UpstreamError, UpstreamResponse};
use super::outbound::{read_body, OutboundClient};
use crate::config::TableauConfig;
use crate::models::tableau::{
    describe_error, CreateWebhookBody, SignInRequest, SignInResponse, WebhookEnvelope,
    WebhookListEnvelope, WebhookSummary,
};

pub const AUTH_HEADER: &str = "X-Tableau-Auth";

/// Short-lived credentials from a successful sign-in.
pub struct TableauSession {
    pub token: String,
    pub site_id: String,
}

impl fmt::Debug for TableauSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableauSession")
            .field("token", &"<redacted>")
            .field("site_id", &self.site_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct TableauService {
    outbound: OutboundClient,
    config: TableauConfig,
}

impl TableauService {
    pub fn new(outbound: OutboundClient, config: TableauConfig) -> Self {
        Self { outbound, config }
    }

    /// Sign in with the configured credentials.
    pub async fn sign_in(&self) -> Result<TableauSession, UpstreamError> {
        let call = UpstreamCall::TableauSignIn;
        let url = self.api_url(call, &["auth", "signin"])?;
        let body = SignInRequest::new(
            self.config.auth_method,
            &self.config.username,
            &self.config.password,
            &self.config.site_id,
        );

        let request = self
            .outbound
            .http()
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&body);

        let (status, response) = self.expect_success(call, request).await?;
        let parsed: SignInResponse = parse_json(call, status, &response)?;
        let credentials = parsed
            .credentials
            .ok_or_else(|| UpstreamError::missing_field(call, status, "credentials"))?;
        let token = credentials
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UpstreamError::missing_field(call, status, "credentials.token"))?;
        let site_id = credentials
            .site
            .and_then(|site| site.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| UpstreamError::missing_field(call, status, "credentials.site.id"))?;

        info!(site_id = %site_id, "Signed in to Tableau Server");
        Ok(TableauSession { token, site_id })
    }

    pub async fn create_webhook(
        &self,
        name: &str,
        event: &str,
        destination_url: &str,
    ) -> Result<WebhookSummary, UpstreamError> {
        let session = self.sign_in().await?;
        let call = UpstreamCall::TableauCreateWebhook;
        let url = self.api_url(call, &["sites", &session.site_id, "webhooks"])?;
        let body = CreateWebhookBody::new(name, event, destination_url);

        let request = self.authorized(self.outbound.http().post(url), &session).json(&body);
        let (status, response) = self.expect_success(call, request).await?;
        let parsed: WebhookEnvelope = parse_json(call, status, &response)?;
        let webhook = parsed
            .webhook
            .map(WebhookSummary::from)
            .ok_or_else(|| UpstreamError::missing_field(call, status, "webhook"))?;

        info!(
            webhook_id = ?webhook.id,
            name = %name,
            event = %event,
            "Tableau webhook created successfully"
        );
        Ok(webhook)
    }

    /// Subscriptions exactly as the server reports them, in server order.
    pub async fn list_webhooks(&self) -> Result<Vec<WebhookSummary>, UpstreamError> {
        let session = self.sign_in().await?;
        let call = UpstreamCall::TableauListWebhooks;
        let url = self.api_url(call, &["sites", &session.site_id, "webhooks"])?;

        let request = self.authorized(self.outbound.http().get(url), &session);
        let (status, response) = self.expect_success(call, request).await?;
        let parsed: WebhookListEnvelope = parse_json(call, status, &response)?;
        let webhooks: Vec<WebhookSummary> = parsed
            .webhooks
            .ok_or_else(|| UpstreamError::missing_field(call, status, "webhooks"))?
            .webhook
            .into_iter()
            .map(WebhookSummary::from)
            .collect();

        info!(count = webhooks.len(), "Listed Tableau webhooks");
        Ok(webhooks)
    }

    /// Delete by id. The id is not checked against the list first.
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<(), UpstreamError> {
        let session = self.sign_in().await?;
        let call = UpstreamCall::TableauDeleteWebhook;
        let url = self.api_url(call, &["sites", &session.site_id, "webhooks", webhook_id])?;

        let request = self.authorized(self.outbound.http().delete(url), &session);
        self.expect_success(call, request).await?;

        info!(webhook_id = %webhook_id, "Tableau webhook deleted successfully");
        Ok(())
    }

    /// `{server}/api/{version}/...` with each segment percent-encoded.
    fn api_url(&self, call: UpstreamCall, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.config.server.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| UpstreamError::transport(call, "TABLEAU_SERVER cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(["api", self.config.version.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, session: &TableauSession) -> RequestBuilder {
        request
            .header(AUTH_HEADER, &session.token)
            .header(header::ACCEPT, "application/json")
    }

    async fn expect_success(
        &self,
        call: UpstreamCall,
        request: RequestBuilder,
    ) -> Result<(StatusCode, UpstreamResponse), UpstreamError> {
        let response = self.outbound.send(call, request).await?;
        let (status, body) = read_body(call, response).await?;

        if status.is_success() {
            return Ok((status, body));
        }

        let message = describe_error(&body.body);
        error!(call = %call, status = %status, error = %message, "Tableau call rejected");
        Err(UpstreamError::rejected(call, status, message, body))
    }
}

fn parse_json<T: DeserializeOwned>(
    call: UpstreamCall,
    status: StatusCode,
    response: &UpstreamResponse,
) -> Result<T, UpstreamError> {
    serde_json::from_str(&response.body).map_err(|e| UpstreamError::MissingExpectedField {
        call,
        status: Some(status),
        message: format!("a valid JSON body ({})", e),
    })
}
