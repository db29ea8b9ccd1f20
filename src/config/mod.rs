use anyhow::Result;
use reqwest::Url;
use std::env;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

pub const DEFAULT_SLACK_COLOR: &str = "#C70039";
pub const DEFAULT_TABLEAU_VERSION: &str = "3.21";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 5;

/// Upper bound for a whole inbound request, including the outbound calls it makes.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Admin requests make two outbound calls in sequence; both must fit inside
/// the inbound request timeout so the caller always sees the upstream failure.
pub const MAX_OUTBOUND_TIMEOUT_SECS: u64 = (REQUEST_TIMEOUT_SECS - 1) / 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub outbound_timeout: Duration,
    pub log_format: LogFormat,
    pub slack: SlackConfig,
    pub tableau: TableauConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct SlackConfig {
    pub webhook_url: Url,
    pub channel: String,
    pub color: String,
}

/// How `TABLEAU_USERNAME` / `TABLEAU_PASSWORD` are presented at sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableauAuthMethod {
    /// Personal access token name and secret
    PersonalAccessToken,
    /// Plain user name and password
    Password,
}

#[derive(Clone)]
pub struct TableauConfig {
    pub server: Url,
    pub username: String,
    pub password: String,
    /// Site content URL; empty selects the default site
    pub site_id: String,
    pub version: String,
    pub auth_method: TableauAuthMethod,
}

// The Slack incoming-webhook path is itself a credential.
impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("webhook_host", &self.webhook_url.host_str())
            .field("channel", &self.channel)
            .field("color", &self.color)
            .finish()
    }
}

impl fmt::Debug for TableauConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableauConfig")
            .field("server", &self.server.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("site_id", &self.site_id)
            .field("version", &self.version)
            .field("auth_method", &self.auth_method)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let slack = SlackConfig {
            webhook_url: parse_url("SLACK_WEBHOOK_URL", &required("SLACK_WEBHOOK_URL")?)?,
            channel: required("SLACK_CHANNEL")?,
            color: optional("SLACK_COLOR", DEFAULT_SLACK_COLOR),
        };

        let auth_method = match optional("TABLEAU_AUTH_METHOD", "pat").to_ascii_lowercase().as_str() {
            "pat" => TableauAuthMethod::PersonalAccessToken,
            "password" => TableauAuthMethod::Password,
            other => {
                return Err(anyhow::anyhow!(
                    "TABLEAU_AUTH_METHOD must be 'pat' or 'password', got '{}'",
                    other
                ))
            }
        };

        let tableau = TableauConfig {
            server: parse_url("TABLEAU_SERVER", &required("TABLEAU_SERVER")?)?,
            username: required("TABLEAU_USERNAME")?,
            password: lookup("TABLEAU_PASSWORD")
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("TABLEAU_PASSWORD environment variable is required"))?,
            // Must be set, but an empty value is the default site.
            site_id: lookup("TABLEAU_SITE_ID")
                .map(|v| v.trim().to_string())
                .ok_or_else(|| anyhow::anyhow!("TABLEAU_SITE_ID environment variable is required"))?,
            version: optional("TABLEAU_VERSION", DEFAULT_TABLEAU_VERSION),
            auth_method,
        };

        let log_format = match optional("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let outbound_timeout_secs: u64 =
            optional("OUTBOUND_TIMEOUT_SECS", &DEFAULT_OUTBOUND_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("OUTBOUND_TIMEOUT_SECS is not a number: {}", e))?;
        if !(1..=MAX_OUTBOUND_TIMEOUT_SECS).contains(&outbound_timeout_secs) {
            return Err(anyhow::anyhow!(
                "OUTBOUND_TIMEOUT_SECS must be between 1 and {}, got {}",
                MAX_OUTBOUND_TIMEOUT_SECS,
                outbound_timeout_secs
            ));
        }

        Ok(Config {
            host: optional("HOST", "0.0.0.0")
                .parse()
                .map_err(|e| anyhow::anyhow!("HOST is not a valid IP address: {}", e))?,
            port: optional("PORT", &DEFAULT_PORT.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT is not a valid port number: {}", e))?,
            outbound_timeout: Duration::from_secs(outbound_timeout_secs),
            log_format,
            slack,
            tableau,
        })
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
    if url.cannot_be_a_base() {
        return Err(anyhow::anyhow!("{} must be an absolute http(s) URL", key));
    }
    Ok(url)
}
