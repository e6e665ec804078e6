//! Error types for wss-service.

/// Result type alias for wss-service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wss-service operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the WSS rejected the credentials or issued no usable session.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::AuthenticationFailed(_))
    }

    /// Returns true if an exchange failed after the retry budget was spent, or on transport failure.
    pub fn is_service_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::ServiceFailure(_))
    }

    /// Returns true if no WSS URL has been configured.
    pub fn is_not_configured(&self) -> bool {
        matches!(self.kind, ErrorKind::NotConfigured)
    }

    /// Re-label an error as a service failure, keeping it as the source.
    pub(crate) fn into_service_failure(self) -> Self {
        if self.is_service_failure() {
            return self;
        }
        Error::with_source(ErrorKind::ServiceFailure(self.kind.to_string()), self)
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Xml(err.to_string()))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// An operation needed the WSS URL before one was set.
    #[error("WSS URL is not configured")]
    NotConfigured,

    /// `GetSession` was rejected or returned an unusable session id.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A `DoService` or `CloseSession` exchange failed.
    #[error("Service failure: {0}")]
    ServiceFailure(String),

    /// Unsupported DCP type.
    #[error("Invalid protocol: {0} not supported")]
    InvalidProtocol(String),

    /// XML could not be read or written.
    #[error("XML error: {0}")]
    Xml(String),

    /// Transport error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),
}

impl From<wss_client::Error> for Error {
    fn from(err: wss_client::Error) -> Self {
        Error::with_source(ErrorKind::Transport(err.to_string()), err)
    }
}

impl From<wss_auth::Error> for Error {
    fn from(err: wss_auth::Error) -> Self {
        let kind = match &err.kind {
            wss_auth::ErrorKind::InvalidSession(message) => {
                ErrorKind::AuthenticationFailed(message.clone())
            }
            wss_auth::ErrorKind::Xml(message) => ErrorKind::Xml(message.clone()),
        };
        Error::with_source(kind, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}
