use reqwest::blocking::{Client as HttpClient, ClientBuilder};
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::time::Duration;
use url::Url;

use crate::error::Result;

/// Public Open Data Hub mobility endpoint
pub const DEFAULT_BASE_URL: &str = "https://mobility.api.opendatahub.com";

/// Keycloak token endpoint for the public realm
pub const DEFAULT_TOKEN_URL: &str =
    "https://auth.opendatahub.com/auth/realms/noi/protocol/openid-connect/token";

/// Create the default HTTP client for API requests
/// with settings for connection pooling and timeouts
pub fn create_http_client() -> Result<HttpClient> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300)) // 5 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Configuration for the time series client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API endpoint, e.g. https://mobility.api.opendatahub.com
    pub base_url: String,
    /// OAuth2 token endpoint, only used once credentials are set
    pub token_url: String,
    /// Sent as `Referer` to identify the application; empty to omit
    pub referer: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            referer: String::new(),
        }
    }
}

impl Config {
    /// Create a configuration for a custom endpoint
    pub fn new(base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into(),
            token_url: token_url.into(),
            referer: String::new(),
        }
    }

    /// Defaults overridden by `ODH_BASE_URL`, `ODH_TOKEN_URL` and `ODH_REFERER`
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(v) = std::env::var("ODH_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = std::env::var("ODH_TOKEN_URL") {
            config.token_url = v;
        }
        if let Ok(v) = std::env::var("ODH_REFERER") {
            config.referer = v;
        }
        config
    }

    /// Set the referer sent with every request
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

/// A single outgoing HTTP call
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body as text, for error reporting
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs HTTP calls on behalf of the client.
///
/// Only connection-level failures are errors; any status code is a
/// successful send.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Ok(ReqwestTransport {
            client: create_http_client()?,
        })
    }

    /// Wrap an existing client, e.g. one with a proxy or custom timeouts
    pub fn with_client(client: HttpClient) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
