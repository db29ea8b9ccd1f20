use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::middleware::current_request_id;
use crate::services::{UpstreamCall, UpstreamError, UpstreamResponse};

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ErrorCode {
    // Validation errors (3xxx)
    #[serde(rename = "VAL_3001")]
    InvalidInput,
    #[serde(rename = "VAL_3002")]
    MissingRequiredField,
    #[serde(rename = "VAL_3003")]
    InvalidFormat,
    #[serde(rename = "VAL_3004")]
    UnsupportedEvent,

    // External service errors (8xxx)
    #[serde(rename = "EXT_8001")]
    ExternalServiceUnavailable,
    #[serde(rename = "EXT_8002")]
    ExternalServiceTimeout,
    #[serde(rename = "EXT_8003")]
    ExternalServiceError,
    #[serde(rename = "EXT_8004")]
    ExternalAuthenticationFailed,
    #[serde(rename = "EXT_8005")]
    UnexpectedUpstreamResponse,

    // Internal errors (9xxx)
    #[serde(rename = "INT_9999")]
    InternalServerError,
}

impl ErrorCode {
    /// Get numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 3001,
            ErrorCode::MissingRequiredField => 3002,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::UnsupportedEvent => 3004,

            ErrorCode::ExternalServiceUnavailable => 8001,
            ErrorCode::ExternalServiceTimeout => 8002,
            ErrorCode::ExternalServiceError => 8003,
            ErrorCode::ExternalAuthenticationFailed => 8004,
            ErrorCode::UnexpectedUpstreamResponse => 8005,

            ErrorCode::InternalServerError => 9999,
        }
    }

    /// Get user-friendly message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input provided",
            ErrorCode::MissingRequiredField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format provided",
            ErrorCode::UnsupportedEvent => "Unsupported Tableau event type",

            ErrorCode::ExternalServiceUnavailable => "External service is currently unavailable",
            ErrorCode::ExternalServiceTimeout => "External service request timed out",
            ErrorCode::ExternalServiceError => "External service error occurred",
            ErrorCode::ExternalAuthenticationFailed => "Authentication with Tableau Server failed",
            ErrorCode::UnexpectedUpstreamResponse => "External service returned an unexpected response",

            ErrorCode::InternalServerError => "An internal server error occurred",
        }
    }
}

/// Structured error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {field}: {message}")]
    Validation {
        code: ErrorCode,
        field: String,
        message: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Tableau authentication failed: {0}")]
    UpstreamAuthentication(String),

    /// Upstream rejected the call; its reply is sent back unchanged.
    #[error("Upstream returned {status}")]
    UpstreamPassThrough {
        status: StatusCode,
        response: UpstreamResponse,
    },

    #[error("External service error: {message}")]
    ExternalService {
        message: String,
        details: Option<String>,
    },

    #[error("Unexpected upstream response: {0}")]
    UnexpectedResponse(String),

    #[error("Could not reach {service}: {message}")]
    Transport {
        service: &'static str,
        message: String,
        timed_out: bool,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create validation error for specific field
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            code: ErrorCode::InvalidInput,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Helper: required field absent or blank
    pub fn missing_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            code: ErrorCode::MissingRequiredField,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Get error code
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Validation { code, .. } => *code,
            ApiError::BadRequest(_) => ErrorCode::InvalidFormat,
            ApiError::UpstreamAuthentication(_) => ErrorCode::ExternalAuthenticationFailed,
            ApiError::UpstreamPassThrough { .. } | ApiError::ExternalService { .. } => {
                ErrorCode::ExternalServiceError
            }
            ApiError::UnexpectedResponse(_) => ErrorCode::UnexpectedUpstreamResponse,
            ApiError::Transport { timed_out: true, .. } => ErrorCode::ExternalServiceTimeout,
            ApiError::Transport { .. } => ErrorCode::ExternalServiceUnavailable,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// Get status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,

            ApiError::UpstreamAuthentication(_)
            | ApiError::ExternalService { .. }
            | ApiError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,

            ApiError::UpstreamPassThrough { status, .. } => *status,

            ApiError::Transport { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,

            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_message(&self) -> String {
        match self {
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::BadRequest(message) => message.clone(),
            ApiError::UpstreamAuthentication(message) => {
                format!("{}: {}", self.error_code().message(), message)
            }
            ApiError::ExternalService { message, .. } => message.clone(),
            _ => self.error_code().message().to_string(),
        }
    }

    /// Get error details
    fn error_details(&self) -> Option<String> {
        match self {
            ApiError::ExternalService { details, .. } => details.clone(),
            ApiError::UnexpectedResponse(details) => Some(details.clone()),
            ApiError::Transport { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    /// Get field name for validation errors
    fn error_field(&self) -> Option<String> {
        match self {
            ApiError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        }
    }

    /// Log error with appropriate level
    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    status = %status,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    status = %status,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());
        let status = self.status_code();

        self.log_error(&request_id);

        let err = match self {
            ApiError::UpstreamPassThrough { response, .. } => {
                let content_type = response
                    .content_type
                    .as_deref()
                    .and_then(|ct| HeaderValue::from_str(ct).ok())
                    .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
                return (status, [(header::CONTENT_TYPE, content_type)], response.body)
                    .into_response();
            }
            other => other,
        };

        let code = err.error_code();
        let error_response = ErrorResponse {
            error: ErrorDetail {
                code,
                code_number: code.code(),
                message: err.error_message(),
                details: err.error_details(),
                field: err.error_field(),
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Translate a service-layer failure into the response the caller sees.
impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::UpstreamCallFailed {
                call,
                status: None,
                message,
                timed_out,
                ..
            } => ApiError::Transport {
                service: service_name(call),
                timed_out,
                message,
            },
            UpstreamError::UpstreamCallFailed {
                call: UpstreamCall::TableauSignIn,
                message,
                ..
            } => ApiError::UpstreamAuthentication(message),
            UpstreamError::UpstreamCallFailed {
                call: UpstreamCall::SlackPost,
                status,
                response,
                ..
            } => ApiError::ExternalService {
                message: match status {
                    Some(status) => format!("Failed to post data to Slack (status {})", status.as_u16()),
                    None => "Failed to post data to Slack".to_string(),
                },
                details: response.map(|r| r.body),
            },
            UpstreamError::UpstreamCallFailed {
                status: Some(status),
                response: Some(response),
                ..
            } => ApiError::UpstreamPassThrough { status, response },
            UpstreamError::UpstreamCallFailed { call, message, .. } => ApiError::ExternalService {
                message: format!("{} failed", service_name(call)),
                details: Some(message),
            },
            err @ UpstreamError::MissingExpectedField { .. } => {
                ApiError::UnexpectedResponse(err.to_string())
            }
        }
    }
}

fn service_name(call: UpstreamCall) -> &'static str {
    match call {
        UpstreamCall::SlackPost => "Slack",
        _ => "Tableau Server",
    }
}

/// Handle Axum JSON rejections and convert to structured API errors
impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        match err {
            JsonRejection::JsonDataError(e) => ApiError::Validation {
                code: ErrorCode::InvalidInput,
                field: "body".to_string(),
                message: e.body_text(),
            },
            JsonRejection::JsonSyntaxError(_) => ApiError::BadRequest("Invalid JSON format".to_string()),
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("JSON content type required".to_string())
            }
            JsonRejection::BytesRejection(_) => {
                ApiError::BadRequest("Invalid request body format".to_string())
            }
            _ => ApiError::BadRequest(format!("Invalid request body: {}", err.body_text())),
        }
    }
}
