use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use url::{form_urlencoded, Url};

use crate::client::{HttpRequest, Transport};
use crate::error::{OdhError, Result};

/// Seconds subtracted from `expires_in` so a token is renewed before the server rejects it
pub const EXPIRY_MARGIN_SECS: i64 = 600;

/// Token represents an OAuth2 token as returned by the token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access token for API requests
    pub access_token: String,

    /// Lifetime of the access token in seconds
    pub expires_in: i64,

    #[serde(rename = "not-before-policy", default)]
    pub not_before_policy: i64,

    #[serde(default)]
    pub refresh_expires_in: i64,

    /// Token type (usually "Bearer")
    #[serde(default)]
    pub token_type: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default)]
    pub scope: String,
}

/// OAuth2 client credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read `ODH_CLIENT_ID` and `ODH_CLIENT_SECRET`; `None` without a client id
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("ODH_CLIENT_ID").ok().filter(|s| !s.is_empty())?;
        let client_secret = std::env::var("ODH_CLIENT_SECRET").unwrap_or_default();
        Some(Credentials::new(client_id, client_secret))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default)]
struct CacheState {
    token: Option<Token>,
    expiry: i64,
}

/// Holds one access token and renews it through the client credentials grant.
///
/// The check-fetch-store sequence runs under a mutex, so concurrent callers
/// trigger at most one fetch and never observe a token without its expiry.
pub struct TokenCache {
    token_url: String,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    state: Mutex<CacheState>,
}

impl TokenCache {
    pub fn new(
        token_url: impl Into<String>,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        TokenCache {
            token_url: token_url.into(),
            credentials,
            transport,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// Return a valid access token, fetching a new one when none is cached
    /// or the cached one is past its expiry.
    ///
    /// Any failure, including a non-200 answer from the token endpoint,
    /// is returned as [`OdhError::Auth`] and leaves the cached token and
    /// expiry as they were.
    pub fn get_token(&self) -> Result<String> {
        self.get_token_with(|| Utc::now().timestamp())
    }

    /// Expiry of the cached token as Unix seconds, margin already applied
    pub fn expiry(&self) -> Option<i64> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.token.as_ref().map(|_| state.expiry)
    }

    /// `now` is read once for the expiry check and again after a fetch
    /// returns, so the expiry counts from the fetch time.
    pub(crate) fn get_token_with<F>(&self, now: F) -> Result<String>
    where
        F: Fn() -> i64,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(token) = &state.token {
            if now() < state.expiry {
                return Ok(token.access_token.clone());
            }
        }

        tracing::info!(client_id = %self.credentials.client_id, "getting new token");
        let token = self.fetch()?;

        state.expiry = now()
            .saturating_add(token.expires_in)
            .saturating_sub(EXPIRY_MARGIN_SECS);
        tracing::debug!(expiry = state.expiry, "auth token expiry computed");

        let access_token = token.access_token.clone();
        state.token = Some(token);
        Ok(access_token)
    }

    fn fetch(&self) -> Result<Token> {
        let url = Url::parse(&self.token_url)
            .map_err(|e| OdhError::auth("unable to create token request", Some(e.into())))?;

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("client_secret", &self.credentials.client_secret)
            .append_pair("grant_type", "client_credentials")
            .finish();

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let response = self
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url,
                headers,
                body: Some(body.into_bytes()),
            })
            .map_err(|e| OdhError::auth("token request failed", Some(e)))?;

        tracing::debug!(status = response.status, "auth response received");
        if !response.is_ok() {
            tracing::warn!(status = response.status, "token endpoint rejected request");
            return Err(OdhError::auth(
                format!("token endpoint returned status {}", response.status),
                Some(OdhError::HttpStatus {
                    status: response.status,
                    body: response.text(),
                }),
            ));
        }

        let token: Token = serde_json::from_slice(&response.body)
            .map_err(|e| OdhError::auth("unable to decode token response", Some(e.into())))?;
        if token.access_token.is_empty() {
            return Err(OdhError::auth("token endpoint returned empty access token", None));
        }
        Ok(token)
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.token_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
