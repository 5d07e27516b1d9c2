use thiserror::Error;

/// Main error type for Open Data Hub client operations
#[derive(Debug, Error)]
pub enum OdhError {
    /// Base URL or token URL could not be parsed
    #[error("invalid URL in client configuration: {0}")]
    Config(#[from] url::ParseError),

    /// A header value (referer, bearer token) contains invalid characters
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Any failure while obtaining an access token
    #[error("error authorizing request: {message}")]
    Auth {
        message: String,
        #[source]
        source: Option<Box<OdhError>>,
    },

    /// Connection-level failure reported by the transport
    #[error("error performing request: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with something other than 200 OK
    #[error("request returned non-OK status: {status}")]
    HttpStatus { status: u16, body: String },

    /// Response body is not the JSON shape the caller asked for
    #[error("unable to decode response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Timestamp text that does not match the API format
    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for OdhError {
    fn from(err: reqwest::Error) -> Self {
        OdhError::Transport(Box::new(err))
    }
}

impl OdhError {
    /// Create an authentication error wrapping the failure that caused it
    pub fn auth(message: impl Into<String>, source: Option<OdhError>) -> Self {
        OdhError::Auth {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    /// Create a transport error from any error type
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OdhError::Transport(Box::new(err))
    }

    /// Check if this error happened while authenticating
    pub fn is_auth(&self) -> bool {
        matches!(self, OdhError::Auth { .. })
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Get the HTTP status code, looking through authentication failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OdhError::HttpStatus { status, .. } => Some(*status),
            OdhError::Auth {
                source: Some(inner),
                ..
            } => inner.status_code(),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, OdhError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_code() {
        let error = OdhError::HttpStatus {
            status: 404,
            body: "not found".to_string(),
        };
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.to_string(), "request returned non-OK status: 404");
    }

    #[test]
    fn test_auth_keeps_source() {
        let inner = OdhError::HttpStatus {
            status: 401,
            body: String::new(),
        };
        let error = OdhError::auth("token endpoint rejected credentials", Some(inner));

        assert!(error.is_auth());
        assert_eq!(error.status_code(), Some(401));
        assert!(error.source().is_some());
        assert_eq!(
            error.to_string(),
            "error authorizing request: token endpoint rejected credentials"
        );
    }

    #[test]
    fn test_config_error_from_url() {
        let error: OdhError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(error, OdhError::Config(_)));
        assert_eq!(error.status_code(), None);
    }
}
