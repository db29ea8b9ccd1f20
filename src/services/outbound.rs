//! Shared outbound HTTP helper used for every Slack and Tableau call.

use metrics::{counter, histogram};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, header};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::error::{UpstreamCall, UpstreamError, UpstreamResponse};

const TIMED_OUT: &str = "request timed out";

#[derive(Clone)]
pub struct OutboundClient {
    client: Client,
    timeout: Duration,
}

impl OutboundClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Issue one request. No retries: a failure is returned to the caller.
    pub async fn send(
        &self,
        call: UpstreamCall,
        request: RequestBuilder,
    ) -> Result<Response, UpstreamError> {
        let request = request
            .build()
            .map_err(|e| transport_error(call, e, self.timeout))?;
        let target = loggable_url(call, request.url());
        let method = request.method().clone();
        let start = Instant::now();

        debug!(call = %call, method = %method, url = %target, "Calling upstream");

        let result = self.client.execute(request).await;
        let elapsed = start.elapsed();
        histogram!("outbound_request_duration_seconds", "call" => call.as_str())
            .record(elapsed.as_secs_f64());

        match result {
            Ok(response) => {
                let status = response.status();
                counter!(
                    "outbound_requests_total",
                    "call" => call.as_str(),
                    "status" => status.as_u16().to_string()
                )
                .increment(1);
                if !status.is_success() {
                    warn!(
                        call = %call,
                        url = %target,
                        status = %status,
                        duration_ms = %elapsed.as_millis(),
                        "Upstream returned non-success status"
                    );
                }
                Ok(response)
            }
            Err(e) => {
                counter!(
                    "outbound_requests_total",
                    "call" => call.as_str(),
                    "status" => "transport_error"
                )
                .increment(1);
                let err = transport_error(call, e, self.timeout);
                error!(
                    call = %call,
                    method = %method,
                    url = %target,
                    duration_ms = %elapsed.as_millis(),
                    timed_out = err.is_timeout(),
                    error = %err,
                    "Upstream call failed before a response was received"
                );
                Err(err)
            }
        }
    }
}

/// Drain a response into its status and raw body.
pub async fn read_body(
    call: UpstreamCall,
    response: Response,
) -> Result<(StatusCode, UpstreamResponse), UpstreamError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let body = response
        .text()
        .await
        .map_err(|e| {
            let timed_out = e.is_timeout();
            let message = format!("failed to read response body: {}", e.without_url());
            if timed_out {
                UpstreamError::timeout(call, message)
            } else {
                UpstreamError::transport(call, message)
            }
        })?;

    Ok((status, UpstreamResponse { content_type, body }))
}

fn transport_error(call: UpstreamCall, err: reqwest::Error, timeout: Duration) -> UpstreamError {
    if err.is_timeout() {
        return UpstreamError::timeout(call, format!("{} after {}s", TIMED_OUT, timeout.as_secs()));
    }
    let err = err.without_url();
    let message = match std::error::Error::source(&err) {
        Some(source) => format!("{}: {}", err, source),
        None => err.to_string(),
    };
    UpstreamError::transport(call, message)
}

/// URL safe to write to logs: no credentials, no query, and only the host
/// for Slack since the incoming-webhook path is a secret.
pub fn loggable_url(call: UpstreamCall, url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown-host");
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    match call {
        UpstreamCall::SlackPost => format!("{}://{}{}/<redacted>", url.scheme(), host, port),
        _ => format!("{}://{}{}{}", url.scheme(), host, port, url.path()),
    }
}
