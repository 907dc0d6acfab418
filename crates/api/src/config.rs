//! Client configuration.
//!
//! [`DaConfig`] is resolved once at start-up (from the environment and CLI
//! flags) and then passed explicitly to the client and services.

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_ADMIN_BASE: &str = "https://admin.da.live";
pub const DEFAULT_PIPELINE_BASE: &str = "https://admin.hlx.page";
pub const DEFAULT_GIT_REF: &str = "main";
pub const DEFAULT_PREVIEW_DOMAIN: &str = "aem.page";
pub const DEFAULT_LIVE_DOMAIN: &str = "aem.live";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hostnames allowed to use plain HTTP for local development.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} URL '{value}': {reason}")]
    InvalidBaseUrl { name: &'static str, value: String, reason: String },
    #[error("{name} must use https for non-localhost hosts; got '{scheme}://'")]
    InsecureBaseUrl { name: &'static str, scheme: String },
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
    #[error("API token contains characters that are not valid in an HTTP header")]
    InvalidToken,
    #[error("could not build the HTTP client: {0}")]
    HttpClient(String),
}

/// Settings for talking to the admin and pipeline APIs.
#[derive(Clone)]
pub struct DaConfig {
    /// Base of the content admin API (source, list, copy, move, versions).
    pub admin_base_url: Url,
    /// Base of the pipeline admin API (preview, publish).
    pub pipeline_base_url: Url,
    /// Bearer token sent with every request when present.
    pub token: Option<String>,
    /// Branch used for preview/publish and public URLs.
    pub git_ref: String,
    pub preview_domain: String,
    pub live_domain: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for DaConfig {
    fn default() -> Self {
        Self {
            admin_base_url: Url::parse(DEFAULT_ADMIN_BASE).expect("default admin base URL"),
            pipeline_base_url: Url::parse(DEFAULT_PIPELINE_BASE).expect("default pipeline base URL"),
            token: None,
            git_ref: DEFAULT_GIT_REF.to_string(),
            preview_domain: DEFAULT_PREVIEW_DOMAIN.to_string(),
            live_domain: DEFAULT_LIVE_DOMAIN.to_string(),
            user_agent: format!("da-mcp/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for DaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaConfig")
            .field("admin_base_url", &self.admin_base_url.as_str())
            .field("pipeline_base_url", &self.pipeline_base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("git_ref", &self.git_ref)
            .field("preview_domain", &self.preview_domain)
            .field("live_domain", &self.live_domain)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl DaConfig {
    /// Build a configuration from environment variables.
    ///
    /// - `DA_ADMIN_TOKEN`: bearer token
    /// - `DA_ADMIN_BASE`: content admin base URL
    /// - `DA_PIPELINE_BASE`: preview/publish admin base URL
    /// - `DA_GIT_REF`: branch for preview/publish (default `main`)
    /// - `DA_REQUEST_TIMEOUT_SECS`: per-request timeout
    ///
    /// Unset or blank variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(token) = non_empty_var("DA_ADMIN_TOKEN") {
            config = config.with_token(token);
        }
        if let Some(base) = non_empty_var("DA_ADMIN_BASE") {
            config = config.with_admin_base(&base)?;
        }
        if let Some(base) = non_empty_var("DA_PIPELINE_BASE") {
            config = config.with_pipeline_base(&base)?;
        }
        if let Some(git_ref) = non_empty_var("DA_GIT_REF") {
            config.git_ref = git_ref;
        }
        if let Some(raw) = non_empty_var("DA_REQUEST_TIMEOUT_SECS") {
            let seconds = raw
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "DA_REQUEST_TIMEOUT_SECS",
                    value: raw,
                })?;
            config.request_timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() { None } else { Some(token.trim().to_string()) };
        self
    }

    pub fn with_admin_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.admin_base_url = validate_base_url("DA_ADMIN_BASE", base)?;
        Ok(self)
    }

    pub fn with_pipeline_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.pipeline_base_url = validate_base_url("DA_PIPELINE_BASE", base)?;
        Ok(self)
    }

    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - must parse and include a host
/// - must be able to carry path segments (no `mailto:`-style URLs)
/// - `localhost` or `127.0.0.1`: any scheme is allowed, otherwise HTTPS only
pub fn validate_base_url(name: &'static str, base: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        name,
        value: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base.trim()).map_err(|error| invalid(error.to_string()))?;
    let host_name = parsed.host_str().ok_or_else(|| invalid("missing host".to_string()))?;
    if parsed.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(parsed);
    }

    if parsed.scheme() != "https" {
        return Err(ConfigError::InsecureBaseUrl {
            name,
            scheme: parsed.scheme().to_string(),
        });
    }
    Ok(parsed)
}
