//! Errors raised while talking to Slack or the Tableau REST API.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// The outbound call an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCall {
    SlackPost,
    TableauSignIn,
    TableauCreateWebhook,
    TableauListWebhooks,
    TableauDeleteWebhook,
}

impl UpstreamCall {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamCall::SlackPost => "slack_post",
            UpstreamCall::TableauSignIn => "tableau_sign_in",
            UpstreamCall::TableauCreateWebhook => "tableau_create_webhook",
            UpstreamCall::TableauListWebhooks => "tableau_list_webhooks",
            UpstreamCall::TableauDeleteWebhook => "tableau_delete_webhook",
        }
    }
}

impl fmt::Display for UpstreamCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw upstream reply kept so it can be relayed unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The call could not be completed (`status` is `None`) or the upstream
    /// answered with a non-success status. `timed_out` is only set when no
    /// complete response arrived before the outbound timeout.
    #[error("{call} failed: {message}")]
    UpstreamCallFailed {
        call: UpstreamCall,
        status: Option<StatusCode>,
        message: String,
        response: Option<UpstreamResponse>,
        timed_out: bool,
    },

    /// The upstream answered successfully but a field we rely on was absent.
    #[error("{call} response is missing {message}")]
    MissingExpectedField {
        call: UpstreamCall,
        status: Option<StatusCode>,
        message: String,
    },
}

impl UpstreamError {
    pub fn transport(call: UpstreamCall, message: impl Into<String>) -> Self {
        UpstreamError::UpstreamCallFailed {
            call,
            status: None,
            message: message.into(),
            response: None,
            timed_out: false,
        }
    }

    pub fn timeout(call: UpstreamCall, message: impl Into<String>) -> Self {
        UpstreamError::UpstreamCallFailed {
            call,
            status: None,
            message: message.into(),
            response: None,
            timed_out: true,
        }
    }

    pub fn rejected(
        call: UpstreamCall,
        status: StatusCode,
        message: impl Into<String>,
        response: UpstreamResponse,
    ) -> Self {
        UpstreamError::UpstreamCallFailed {
            call,
            status: Some(status),
            message: message.into(),
            response: Some(response),
            timed_out: false,
        }
    }

    pub fn missing_field(call: UpstreamCall, status: StatusCode, field: impl Into<String>) -> Self {
        UpstreamError::MissingExpectedField {
            call,
            status: Some(status),
            message: field.into(),
        }
    }

    pub fn call(&self) -> UpstreamCall {
        match self {
            UpstreamError::UpstreamCallFailed { call, .. }
            | UpstreamError::MissingExpectedField { call, .. } => *call,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::UpstreamCallFailed { status, .. }
            | UpstreamError::MissingExpectedField { status, .. } => *status,
        }
    }

    /// No response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, UpstreamError::UpstreamCallFailed { status: None, .. })
    }

    /// The call was abandoned after the outbound timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::UpstreamCallFailed { timed_out: true, .. })
    }
}
