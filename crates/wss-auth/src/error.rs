//! Error types for wss-auth.
//!
//! Error messages never include credential values.

/// Result type alias for wss-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wss-auth operations.
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

    /// Wrap an XML reader or writer failure.
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Xml(err.to_string()))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A session document could not be turned into a usable session.
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// XML could not be read or written.
    #[error("XML error: {0}")]
    Xml(String),
}
