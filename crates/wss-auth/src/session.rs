//! Session handles issued by `GetSession`.

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

/// Timestamp layout of `Session/@expirationDate` in legacy session documents.
const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// An opaque session id issued by the WSS.
///
/// The id is redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SessionHandle {
    /// Wrap a session id as returned by the server.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expires_at: None,
        }
    }

    /// Attach an expiration timestamp.
    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Expiration timestamp, when the server reported one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the id can authorize requests.
    ///
    /// Ids of length 0 or exactly 2 are what the WSS hands out when it did not
    /// actually open a session, so both count as absent.
    pub fn is_valid(&self) -> bool {
        !matches!(self.id.chars().count(), 0 | 2)
    }

    /// Whether the expiration timestamp lies in the past. Sessions without one never expire client-side.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() > at)
    }

    /// Parse the legacy `<Session id=".." expirationDate=".."/>` response document.
    pub fn from_session_document(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut id = None;
        let mut expiration = None;

        loop {
            match reader.read_event().map_err(Error::xml)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Session" => {
                    for attr in e.attributes() {
                        let attr = attr.map_err(Error::xml)?;
                        let value = attr.unescape_value().map_err(Error::xml)?;
                        match attr.key.local_name().as_ref() {
                            b"id" => id = Some(value.trim().to_string()),
                            b"expirationDate" => expiration = Some(value.trim().to_string()),
                            _ => {}
                        }
                    }
                    break;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let id = id.unwrap_or_default();
        let expiration = expiration.unwrap_or_default();
        let expires_at = NaiveDateTime::parse_from_str(&expiration, EXPIRATION_FORMAT)
            .map_err(|e| {
                Error::with_source(
                    ErrorKind::InvalidSession(format!(
                        "unreadable expirationDate '{}'",
                        expiration
                    )),
                    e,
                )
            })?
            .and_utc();

        debug!(id_len = id.len(), %expires_at, "Parsed session document");
        Ok(Self::new(id).with_expiration(expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_validity_boundary() {
        assert!(!SessionHandle::new("").is_valid());
        assert!(!SessionHandle::new("ID").is_valid());
        assert!(!SessionHandle::new("\r\n").is_valid());

        assert!(SessionHandle::new("I").is_valid());
        assert!(SessionHandle::new("ID1").is_valid());
        assert!(SessionHandle::new("ID1234-5.6789").is_valid());
    }

    #[test]
    fn test_validity_counts_characters_not_bytes() {
        // two characters, four bytes
        assert!(!SessionHandle::new("ää").is_valid());
    }

    #[test]
    fn test_expiration() {
        let handle = SessionHandle::new("ID1");
        assert!(!handle.is_expired());

        let past = SessionHandle::new("ID1").with_expiration(Utc::now() - Duration::minutes(5));
        assert!(past.is_expired());

        let future = SessionHandle::new("ID1").with_expiration(Utc::now() + Duration::minutes(5));
        assert!(!future.is_expired());
    }

    #[test]
    fn test_from_session_document() {
        let xml = r#"<?xml version="1.0"?>
            <SessionResponse>
              <Session id=" ID0815-1.234 " expirationDate="2024-03-01T12:30:45.123Z"/>
            </SessionResponse>"#;

        let handle = SessionHandle::from_session_document(xml).unwrap();
        assert_eq!(handle.id(), "ID0815-1.234");
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
            + Duration::milliseconds(123);
        assert_eq!(handle.expires_at(), Some(expected));
        assert!(handle.is_expired());
    }

    #[test]
    fn test_from_session_document_rejects_bad_date() {
        let xml = r#"<Session id="ID1" expirationDate="tomorrow"/>"#;
        let err = SessionHandle::from_session_document(xml).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSession(_)));

        let err = SessionHandle::from_session_document("<Other/>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSession(_)));
    }

    #[test]
    fn test_debug_redacts_id() {
        let debug = format!("{:?}", SessionHandle::new("ID-secret-42"));
        assert!(!debug.contains("ID-secret-42"));
    }

    #[test]
    fn test_serde_roundtrip_omits_missing_expiration() {
        let json = serde_json::to_string(&SessionHandle::new("ID1")).unwrap();
        assert_eq!(json, r#"{"id":"ID1"}"#);
        let back: SessionHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SessionHandle::new("ID1"));
    }
}
