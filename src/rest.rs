use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, REFERER};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::client::{Config, HttpRequest, ReqwestTransport, Transport};
use crate::error::{OdhError, Result};
use crate::request::Request;
use crate::response::Response;
use crate::token::{Credentials, TokenCache};

/// URL and headers for a read-only query, ready to hand to a [`Transport`]
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

/// Client for the time series API.
///
/// Holds its configuration, transport and token cache; share it by
/// reference (or in an `Arc`) between threads.
pub struct Client {
    /// Configuration
    pub config: Config,
    transport: Arc<dyn Transport>,
    auth: Option<TokenCache>,
}

impl Client {
    /// Create a client for the given configuration using reqwest
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Client for the public endpoint, identifying the application by `referer`
    pub fn new_default(referer: impl Into<String>) -> Result<Self> {
        Self::new(Config::default().with_referer(referer))
    }

    /// Create a client performing its HTTP calls through `transport`
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Client {
            config,
            transport,
            auth: None,
        }
    }

    /// Authenticate every request with a client credentials token
    pub fn use_auth(&mut self, client_id: impl Into<String>, client_secret: impl Into<String>) {
        self.set_credentials(Credentials::new(client_id, client_secret));
    }

    /// Same as [`Client::use_auth`], builder style
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.set_credentials(credentials);
        self
    }

    fn set_credentials(&mut self, credentials: Credentials) {
        self.auth = Some(TokenCache::new(
            self.config.token_url.clone(),
            credentials,
            self.transport.clone(),
        ));
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }

    /// Token cache in use, if credentials were set
    pub fn token_cache(&self) -> Option<&TokenCache> {
        self.auth.as_ref()
    }

    /// Compose URL and headers for `path` with the non-default parameters of `req`
    pub fn build_request(&self, path: &str, req: &Request) -> Result<PreparedRequest> {
        let mut url = self.base_url()?;
        append_path(&mut url, path);

        let pairs = req.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(PreparedRequest {
            headers: self.headers()?,
            url,
        })
    }

    /// Query `/v2/{repr}/{stationTypes}`
    pub fn station_types<T>(&self, req: &Request) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.get_path(&req.station_type_path(), req)
    }

    /// Query the most recent measurements
    pub fn latest<T>(&self, req: &Request) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.get_path(&req.latest_path(), req)
    }

    /// Query measurements between `req.from` and `req.to`
    pub fn history<T>(&self, req: &Request) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.get_path(&req.history_path(), req)
    }

    /// Fetch a raw path and query string appended to the base URL,
    /// e.g. `/v2/flat/ParkingStation?limit=1`
    pub fn get<T>(&self, path_and_query: &str) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(&format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            path_and_query
        ))?;
        let prepared = PreparedRequest {
            url,
            headers: self.headers()?,
        };
        self.execute(prepared)
    }

    fn get_path<T>(&self, path: &str, req: &Request) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let prepared = self.build_request(path, req)?;
        self.execute(prepared)
    }

    /// Send a prepared request and decode the envelope
    pub fn execute<T>(&self, prepared: PreparedRequest) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(url = %prepared.url, "time series request");

        let response = self.transport.send(HttpRequest {
            method: Method::GET,
            url: prepared.url,
            headers: prepared.headers,
            body: None,
        })?;

        if !response.is_ok() {
            return Err(OdhError::HttpStatus {
                status: response.status,
                body: response.text(),
            });
        }

        Response::from_slice(&response.body)
    }

    fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.config.base_url)?)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref auth) = self.auth {
            let token = auth.get_token()?;
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        if !self.config.referer.is_empty() {
            headers.insert(REFERER, HeaderValue::from_str(&self.config.referer)?);
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

fn append_path(url: &mut Url, path: &str) {
    let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
    url.set_path(&joined);
}
